message! {
    /// Raw per-epoch code and carrier sample handed from a tracking channel to the PVT task.
    pub struct Measurement = Measurement {
        pub code_time: f64,
        /// Chips
        pub code_phase: f64,
        /// Cycles
        pub carrier_phase: f64,
        pub carrier_phase_prev: f64,
        pub carrier_phase_prev_prev: f64,
        /// Chips, mod 1023
        pub code_phase_mod: f64,
        /// Cycles, mod 1
        pub carrier_phase_mod: f64,
        pub code_nco: f64,
        pub carrier_nco: f64,
        pub epoch_1ms: i32,
        pub epoch_20ms: i32,
        pub z_count: i32,
        /// Non-zero when tagged as a good measurement
        pub navigate: i32,
        pub sv: i32,
        pub chan: i32,
        /// Receiver tick of the sample
        pub count: i32,
    }
}

message! {
    /// Navigation-ready pseudorange, in both time and distance.
    pub struct Pseudorange = Pseudorange {
        pub gpstime: f64,
        /// Seconds
        pub time: f64,
        /// Seconds/second
        pub time_rate: f64,
        pub meters: f64,
        /// Meters/second
        pub meters_rate: f64,
        /// Meters
        pub residual: f64,
        /// Meters/second
        pub rate_residual: f64,
        pub time_uncorrected: f64,
        /// Value from the previous step, for error checks
        pub previous: f64,
    }
}
