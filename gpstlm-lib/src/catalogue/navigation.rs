use super::MAX_CHANNELS;

message! {
    /// Least squares PVT solution.
    ///
    /// Positions are ECEF meters, velocities m/s, accelerations m/s^2; geodetic angles are
    /// radians.
    pub struct Sps = Sps {
        pub x: f64,
        pub y: f64,
        pub z: f64,
        pub vx: f64,
        pub vy: f64,
        pub vz: f64,
        pub ax: f64,
        pub ay: f64,
        pub az: f64,
        /// Seconds
        pub time: f64,
        /// Seconds
        pub clock_bias: f64,
        /// Meters/second
        pub clock_rate: f64,
        pub latitude: f64,
        pub longitude: f64,
        /// Meters
        pub altitude: f64,
        pub gdop: f64,
        pub pdop: f64,
        pub tdop: f64,
        pub hdop: f64,
        pub vdop: f64,
        /// Bit mask of SVs in the solution, not a count
        pub nsvs: i32,
        pub converged: i32,
        /// Receiver tick the solution belongs to
        pub tic: i32,
        /// Ticks since the last good solution
        pub stale_ticks: i32,
        pub converged_ticks: i32,
        /// SVs used in the last estimate
        pub nav_channels: i32,
        /// Latched once at first convergence
        pub initial_convergence: i32,
        pub chanmap: [i32; MAX_CHANNELS],
    }
}

message! {
    /// Receiver clock state.
    pub struct Clock = Clock {
        /// Elapsed receiver time, seconds
        pub receiver_time: f64,
        pub rate: f64,
        pub bias: f64,
        /// GPS second guessed at initialization
        pub time0: f64,
        /// Best estimate of GPS time, seconds
        pub time: f64,
        /// Uncorrected time, seconds
        pub time_raw: f64,
        pub week: f64,
        pub state: u32,
    }
}

message! {
    /// SV state used in the PVT solution. ECEF meters, m/s, m/s^2; angles in radians.
    pub struct SvPosition = SvPosition {
        pub x: f64,
        pub y: f64,
        pub z: f64,
        pub vx: f64,
        pub vy: f64,
        pub vz: f64,
        pub ax: f64,
        pub ay: f64,
        pub az: f64,
        pub elev: f64,
        pub azim: f64,
        pub clock_bias: f64,
        pub frequency_bias: f64,
        /// Time of flight from SV to receiver, seconds
        pub transit_time: f64,
        pub time: f64,
        /// WGS-84
        pub latitude: f64,
        /// WGS-84
        pub longitude: f64,
        pub altitude: f64,
    }
}

message! {
    /// Extended Kalman filter navigation solution. Same layout and units as [Sps], sent
    /// under its own packet id.
    pub struct Ekf = Ekf {
        pub x: f64,
        pub y: f64,
        pub z: f64,
        pub vx: f64,
        pub vy: f64,
        pub vz: f64,
        pub ax: f64,
        pub ay: f64,
        pub az: f64,
        pub time: f64,
        pub clock_bias: f64,
        pub clock_rate: f64,
        pub latitude: f64,
        pub longitude: f64,
        pub altitude: f64,
        pub gdop: f64,
        pub pdop: f64,
        pub tdop: f64,
        pub hdop: f64,
        pub vdop: f64,
        pub nsvs: i32,
        pub converged: i32,
        pub tic: i32,
        pub stale_ticks: i32,
        pub converged_ticks: i32,
        pub nav_channels: i32,
        pub initial_convergence: i32,
        pub chanmap: [i32; MAX_CHANNELS],
    }
}
