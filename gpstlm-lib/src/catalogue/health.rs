use super::MAX_TASKS;

message! {
    /// Receiver board status: FPGA versions, RF attenuator state, A/D overflow counters and
    /// power-on self test results.
    pub struct BoardHealth = BoardHealth {
        /// Tracking FPGA version
        pub trk_version: u32,
        /// Acquisition FPGA version
        pub acq_version: u32,
        /// RF digital step attenuator, RF chain 0
        pub dsa0: u32,
        /// IF digital step attenuator, RF chain 0
        pub dsa1: u32,
        /// RF digital step attenuator, RF chain 1
        pub dsa2: u32,
        /// IF digital step attenuator, RF chain 1
        pub dsa3: u32,
        /// Non-zero when the 1.54 GHz downmix LO is locked to the synthesizer
        pub lo_locked: u32,
        /// Overflow counter, A/D 0
        pub ovrflw0: u32,
        /// Overflow counter, A/D 1
        pub ovrflw1: u32,
        /// Overflow counter, A/D 2
        pub ovrflw2: u32,
        /// Overflow counter, A/D 3
        pub ovrflw3: u32,
        /// Acquisition SRAM self test: failing location
        pub sram_bad_mem: u32,
        /// Acquisition SRAM self test: high word
        pub sram_bad_hi: u32,
        /// Acquisition SRAM self test: low word
        pub sram_bad_lo: u32,
        pub missed_interrupts: u32,
        pub software_major: u32,
        pub software_minor: u32,
        /// Release stage (alpha, beta, gold)
        pub software_postfix: u32,
    }
}

message! {
    /// Per-task execution timing, in RTOS ticks.
    pub struct TaskHealth = TaskHealth {
        pub execution_tic: [u32; MAX_TASKS],
        /// Tick at task entry
        pub start_tic: [u32; MAX_TASKS],
        /// Tick at task exit
        pub stop_tic: [u32; MAX_TASKS],
    }
}

message! {
    /// Tracking state of one hardware channel.
    pub struct ChannelHealth = ChannelHealth {
        pub chan: u32,
        pub state: u32,
        /// PRN being tracked
        pub svnum: u32,
        pub antenna: u32,
        /// Accumulation length, 1 or 20 (ms)
        pub accum_len: u32,
        /// 3rd order PLL state
        pub w: f32,
        /// 3rd order PLL state
        pub x: f32,
        /// 3rd order PLL state
        pub f: f32,
        /// Carrier to noise density estimate
        pub cn0: u32,
        /// Filtered I^2+Q^2
        pub pp_fltr: i32,
        pub bit_lock: u32,
        pub frame_lock: u32,
        /// Non-zero when this channel is used for navigation
        pub navigate: u32,
        /// Accumulations processed
        pub active_count: u32,
        pub subframe: u32,
        /// Best estimate of the bit edge position
        pub bit_epoch: u32,
    }
}
