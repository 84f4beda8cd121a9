message! {
    /// Decoded broadcast ephemeris for one SV. Times are seconds of week unless noted;
    /// angles are radians.
    pub struct Ephemeris = Ephemeris {
        /// 0 when no valid data
        pub valid: i32,
        /// Subframe 1 transmission time
        pub tofxmission: i32,
        /// Truncated TOW count
        pub tow: i32,
        pub subframe_1_health: i32,
        pub code_on_l2: i32,
        /// GPS week at subframe 1 reception
        pub week_number: i32,
        pub l2_pdata: i32,
        /// User range accuracy code
        pub ura: i32,
        /// Issue of data, clock
        pub iodc: i32,
        /// Group delay
        pub tgd: f64,
        /// GPS week of toc
        pub tocwk: i32,
        /// Reference time of clock parameters
        pub toc: f64,
        pub af0: f64,
        pub af1: f64,
        pub af2: f64,
        /// Issue of data, ephemeris
        pub iode: i32,
        /// Sine harmonic correction to orbital radius
        pub crs: f64,
        /// Mean motion delta from computed value
        pub deltan: f64,
        /// Mean anomaly at toe
        pub m0: f64,
        /// Cosine harmonic correction to argument of latitude
        pub cuc: f64,
        pub ecc: f64,
        /// Sine harmonic correction to argument of latitude
        pub cus: f64,
        /// Square root of the semi-major axis
        pub sqrta: f64,
        /// GPS week of toe
        pub toewk: i32,
        /// Reference time of ephemeris
        pub toe: f64,
        /// Fit interval
        pub fti: i32,
        pub cic: f64,
        /// Right ascension at toe
        pub om0: f64,
        pub cis: f64,
        /// Inclination at toe
        pub in0: f64,
        pub crc: f64,
        /// Argument of perigee
        pub argp: f64,
        /// Rate of right ascension
        pub omd: f64,
        /// Rate of inclination
        pub idot: f64,
        /// Derived, sqrta^2
        pub a: f64,
        /// Derived mean motion
        pub n0: f64,
        pub relativistic: f64,
        pub zcount: i32,
        pub sv: i32,
    }
}

message! {
    /// Decoded almanac for one SV.
    pub struct Almanac = Almanac {
        /// Non-zero once decoded
        pub decoded: u32,
        pub health: i32,
        pub ecc: f64,
        /// Time of almanac
        pub toa: f64,
        pub in0: f64,
        pub omd: f64,
        pub sqrta: f64,
        pub om0: f64,
        pub argp: f64,
        pub m0: f64,
        pub af0: f64,
        pub af1: f64,
        pub week: i32,
    }
}
