// Option catalog - the ordered, backend-supported values for each enumerable parameter

use std::fmt;
use std::str::FromStr;

/// Sentinel meaning "leave this property as it is in the source"
pub const COPY: &str = "copy";

/// Enumerable transcode parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parameter {
    VideoCodec,
    AudioCodec,
    VideoHeight,
    Fps,
    VideoBitrate,
    Rotate,
    WatermarkPlacement,
}

impl Parameter {
    pub const ALL: [Parameter; 7] = [
        Parameter::VideoCodec,
        Parameter::AudioCodec,
        Parameter::VideoHeight,
        Parameter::Fps,
        Parameter::VideoBitrate,
        Parameter::Rotate,
        Parameter::WatermarkPlacement,
    ];

    /// Field name as it appears in TranscodeParameters (and on the wire)
    pub fn field_name(self) -> &'static str {
        match self {
            Parameter::VideoCodec => "video_codec",
            Parameter::AudioCodec => "audio_codec",
            Parameter::VideoHeight => "video_height",
            Parameter::Fps => "fps",
            Parameter::VideoBitrate => "video_bitrate",
            Parameter::Rotate => "rotate",
            Parameter::WatermarkPlacement => "watermark_placement",
        }
    }

    /// Look up a parameter by field name.
    ///
    /// Unknown names are a programming error and panic; use `str::parse` for user input.
    pub fn by_name(name: &str) -> Parameter {
        match name.parse() {
            Ok(param) => param,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn options(self) -> &'static OptionSet {
        match self {
            Parameter::VideoCodec => &VIDEO_CODECS,
            Parameter::AudioCodec => &AUDIO_CODECS,
            Parameter::VideoHeight => &VIDEO_HEIGHTS,
            Parameter::Fps => &FPS_VALUES,
            Parameter::VideoBitrate => &VIDEO_BITRATES,
            Parameter::Rotate => &ROTATIONS,
            Parameter::WatermarkPlacement => &WATERMARK_PLACEMENTS,
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownParameter(pub String);

impl fmt::Display for UnknownParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown transcode parameter '{}'", self.0)
    }
}

impl std::error::Error for UnknownParameter {}

impl FromStr for Parameter {
    type Err = UnknownParameter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parameter::ALL
            .into_iter()
            .find(|p| p.field_name() == s)
            .ok_or_else(|| UnknownParameter(s.to_string()))
    }
}

/// One parameter's legal values
#[derive(Debug)]
pub struct OptionSet {
    /// Whether "copy" is accepted for this parameter
    pub passthrough: bool,
    pub values: &'static [&'static str],
}

impl OptionSet {
    pub fn contains(&self, value: &str) -> bool {
        (self.passthrough && value == COPY) || self.values.contains(&value)
    }

    /// Ordered for presentation: "copy" first when offered
    pub fn allowed_values(&self) -> Vec<&'static str> {
        let mut out = Vec::with_capacity(self.values.len() + 1);
        if self.passthrough {
            out.push(COPY);
        }
        out.extend_from_slice(self.values);
        out
    }
}

pub static VIDEO_CODECS: OptionSet = OptionSet {
    passthrough: true,
    values: &["h264", "h265"],
};

pub static AUDIO_CODECS: OptionSet = OptionSet {
    passthrough: true,
    values: &["aac", "mp3"],
};

pub static VIDEO_HEIGHTS: OptionSet = OptionSet {
    passthrough: true,
    values: &["480", "720", "1080", "1440", "2160", "3840", "4320"],
};

pub static FPS_VALUES: OptionSet = OptionSet {
    passthrough: true,
    values: &["23.976", "24", "25", "30", "60"],
};

// Bits per second
pub static VIDEO_BITRATES: OptionSet = OptionSet {
    passthrough: true,
    values: &[
        "262144", "524288", "1048576", "2097152", "5242880", "10485760", "20971520", "41943040",
        "52428800",
    ],
};

pub static ROTATIONS: OptionSet = OptionSet {
    passthrough: true,
    values: &["90", "180", "270"],
};

pub static WATERMARK_PLACEMENTS: OptionSet = OptionSet {
    passthrough: false,
    values: &["top-right", "random", "horizontal", "diagonal", "bounce", "spiral"],
};

/// Ordered legal values for a parameter
pub fn allowed_values(param: Parameter) -> Vec<&'static str> {
    param.options().allowed_values()
}
