/// A named device capacity tier used to score artifact portability.
///
/// Each class carries a fixed capacity budget for weight-bearing files;
/// the size-fit metric scores an artifact independently against every class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceClass {
    RaspberryPi,
    JetsonNano,
    DesktopPc,
    AwsServer,
}

impl DeviceClass {
    /// All recognized device classes, in wire order.
    pub const ALL: [Self; 4] = [Self::RaspberryPi, Self::JetsonNano, Self::DesktopPc, Self::AwsServer];

    /// The wire key of this class in the `size_score` map.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::RaspberryPi => "raspberry_pi",
            Self::JetsonNano => "jetson_nano",
            Self::DesktopPc => "desktop_pc",
            Self::AwsServer => "aws_server",
        }
    }

    /// Capacity budget for weight files, in megabytes.
    #[must_use]
    pub const fn max_mb(self) -> f64 {
        match self {
            Self::RaspberryPi => 250.0,
            Self::JetsonNano => 500.0,
            Self::DesktopPc => 4_000.0,
            Self::AwsServer => 16_000.0,
        }
    }
}
