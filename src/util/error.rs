use std::borrow::Cow;
use std::fmt;

/// Broad category of a failure, used to decide how it is reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required setting or credential is missing or malformed.
    Config,
    /// A record the script looked for is not in the response.
    Lookup,
    /// The network call failed or returned a non-success status.
    Transport,
    /// The secret-hosting service rejected an upload.
    Upload,
    /// A value could not be encoded or decoded.
    Encoding,
    /// Interactive input was rejected.
    Input,
    /// A simulation sandbox limit was exceeded.
    Limit,
    Crypto,
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Config => "config",
            ErrorKind::Lookup => "lookup",
            ErrorKind::Transport => "transport",
            ErrorKind::Upload => "upload",
            ErrorKind::Encoding => "encoding",
            ErrorKind::Input => "input",
            ErrorKind::Limit => "limit",
            ErrorKind::Crypto => "crypto",
            ErrorKind::Io => "io",
        };
        f.write_str(s)
    }
}

pub struct Error {
    kind: ErrorKind,
    message: Cow<'static, str>,
    location: &'static str,
}

impl Error {
    pub const fn from_static(kind: ErrorKind, s: &'static str, location: &'static str) -> Self {
        Self {
            kind,
            message: Cow::Borrowed(s),
            location,
        }
    }

    pub fn from_string(kind: ErrorKind, s: String, location: &'static str) -> Self {
        Self {
            kind,
            message: Cow::Owned(s),
            location,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn as_str(&self) -> &str {
        &self.message
    }

    pub fn location(&self) -> &'static str {
        self.location
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {} @ {}", self.kind, self.message, self.location)
    }
}

impl std::error::Error for Error {}

macro_rules! convert {
    ($from:ty, $kind:ident) => {
        impl From<$from> for Error {
            fn from(value: $from) -> Self {
                Self::from_string(ErrorKind::$kind, value.to_string(), "<converted>")
            }
        }
    };
}

convert!(std::io::Error, Io);
convert!(reqwest::Error, Transport);
convert!(serde_json::Error, Encoding);
convert!(hex::FromHexError, Encoding);
convert!(toml::de::Error, Config);
convert!(toml::ser::Error, Config);
convert!(k256::elliptic_curve::Error, Crypto);
convert!(k256::ecdsa::Error, Crypto);

#[macro_export]
macro_rules! error {
    ($kind:ident, $msg:literal) => (
        $crate::util::Error::from_static(
            $crate::util::ErrorKind::$kind,
            $msg,
            concat!(file!(), ":", line!()),
        )
    );
    ($kind:ident, $fmt:literal, $($arg:tt)*) => (
        $crate::util::Error::from_string(
            $crate::util::ErrorKind::$kind,
            format!($fmt, $($arg)*),
            concat!(file!(), ":", line!()),
        )
    );
}

#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => (
        return std::result::Result::Err($crate::error!($($arg)*))
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing() -> Result<(), Error> {
        bail!(Config, "monoApiKey is not set");
    }

    #[test]
    fn display_is_message_only() {
        let err = missing().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert_eq!(err.to_string(), "monoApiKey is not set");
        assert!(format!("{:?}", err).starts_with("config error: monoApiKey is not set @ src/util/error.rs:"));
    }

    #[test]
    fn location_points_at_the_call_site() {
        let err = missing().unwrap_err();
        assert!(err.location().starts_with("src/util/error.rs:"));
        let converted: Error = hex::decode("0").unwrap_err().into();
        assert_eq!(converted.location(), "<converted>");
    }

    #[test]
    fn formatted_errors_own_their_message() {
        let err = error!(Limit, "at most {} requests allowed", 5);
        assert_eq!(err.as_str(), "at most 5 requests allowed");
        assert_eq!(err.kind(), ErrorKind::Limit);
    }

    #[test]
    fn conversions_pick_a_kind() {
        let err: Error = hex::decode("zz").unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::Encoding);
        let err: Error = std::io::Error::new(std::io::ErrorKind::Other, "boom").into();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
