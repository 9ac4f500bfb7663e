use std::fmt;
use std::str::FromStr;

use primitive_types::U256;

use crate::functions::encoding::{decode_int256, decode_uint256};
use crate::util::{self, Error};
use crate::bail;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReturnType {
    Uint256,
    Int256,
    String,
    Bytes,
}

impl ReturnType {
    pub fn as_str(self) -> &'static str {
        match self {
            ReturnType::Uint256 => "uint256",
            ReturnType::Int256 => "int256",
            ReturnType::String => "string",
            ReturnType::Bytes => "bytes",
        }
    }
}

impl fmt::Display for ReturnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReturnType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "uint256" => ReturnType::Uint256,
            "int256" => ReturnType::Int256,
            "string" => ReturnType::String,
            "bytes" => ReturnType::Bytes,
            _ => bail!(Encoding, "unsupported return type {}", s),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodedResult {
    Uint256(U256),
    Int256 { negative: bool, magnitude: U256 },
    String(String),
    Bytes(Vec<u8>),
}

impl fmt::Display for DecodedResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedResult::Uint256(value) => write!(f, "{}", value),
            DecodedResult::Int256 { negative, magnitude } => {
                if *negative {
                    write!(f, "-{}", magnitude)
                } else {
                    write!(f, "{}", magnitude)
                }
            }
            DecodedResult::String(value) => f.write_str(value),
            DecodedResult::Bytes(value) => f.write_str(&util::to_hex(value)),
        }
    }
}

/// Decodes a script's hex payload according to the request's declared return
/// type.
pub fn decode_result(hex: &str, return_type: ReturnType) -> Result<DecodedResult, Error> {
    let bytes = util::from_hex(hex)?;
    Ok(match return_type {
        ReturnType::Uint256 => DecodedResult::Uint256(decode_uint256(&bytes)?),
        ReturnType::Int256 => {
            let (negative, magnitude) = decode_int256(&bytes)?;
            DecodedResult::Int256 {
                negative,
                magnitude,
            }
        }
        ReturnType::String => match String::from_utf8(bytes) {
            Ok(value) => DecodedResult::String(value),
            Err(_) => bail!(Encoding, "response is not valid UTF-8"),
        },
        ReturnType::Bytes => DecodedResult::Bytes(bytes),
    })
}
