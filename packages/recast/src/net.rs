//! Network address conversion.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use crate::convert::{Context, FromValue};
use crate::error::Error;
use crate::value::{Data, Value};

impl FromValue for IpAddr {
    /// Raw 4-byte buffers are IPv4 octets, 16-byte buffers IPv6; everything
    /// else parses through its string form.
    fn from_value(value: &Value, _ctx: &Context<'_>) -> Result<Self, Error> {
        match value.data() {
            Data::Null => Err(Error::NilValue),
            Data::Ip(ip) => Ok(*ip),
            Data::Bytes(bytes) => match bytes.len() {
                4 => {
                    let mut octets = [0u8; 4];
                    octets.copy_from_slice(bytes);
                    Ok(IpAddr::from(octets))
                }
                16 => {
                    let mut octets = [0u8; 16];
                    octets.copy_from_slice(bytes);
                    Ok(IpAddr::from(octets))
                }
                _ => Err(Error::parse_msg(
                    format!("{bytes:?}"),
                    "expected 4 or 16 bytes for an IP address",
                )),
            },
            _ => {
                let s = value.as_string();
                let s = s.trim();
                s.parse::<IpAddr>().map_err(|err| Error::parse(s, err))
            }
        }
    }
}

/// A 48-bit hardware address.
///
/// Parses the usual colon, hyphen, and Cisco dot notations. EUI-48 only:
/// the longer 8-octet EUI-64 and 20-octet InfiniBand forms are rejected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MacAddr([u8; 6]);

impl MacAddr {
    /// Address from raw octets.
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    /// The raw octets.
    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let o = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            o[0], o[1], o[2], o[3], o[4], o[5]
        )
    }
}

impl FromStr for MacAddr {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        let bad = || Error::parse_msg(input, "not a MAC address");
        let groups: Vec<&str> = if input.contains(':') {
            input.split(':').collect()
        } else if input.contains('-') {
            input.split('-').collect()
        } else if input.contains('.') {
            input.split('.').collect()
        } else {
            return Err(bad());
        };
        let group_len = match groups.len() {
            6 => 2,
            3 => 4,
            _ => return Err(bad()),
        };
        if groups.iter().any(|g| g.len() != group_len || !g.is_ascii()) {
            return Err(bad());
        }
        let mut octets = [0u8; 6];
        let mut i = 0;
        for group in groups {
            for pair in 0..group.len() / 2 {
                octets[i] = u8::from_str_radix(&group[pair * 2..pair * 2 + 2], 16)
                    .map_err(|_| bad())?;
                i += 1;
            }
        }
        Ok(MacAddr(octets))
    }
}

impl FromValue for MacAddr {
    /// Parses the string form of the value; raw byte payloads are not read
    /// as octets.
    fn from_value(value: &Value, _ctx: &Context<'_>) -> Result<Self, Error> {
        if value.is_nil() {
            return Err(Error::NilValue);
        }
        value.as_string().parse()
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    #[test]
    fn ip_from_bytes_and_strings() {
        let ip = Value::new(vec![127u8, 0, 0, 1]).as_ip().unwrap();
        assert_eq!(ip, IpAddr::V4(Ipv4Addr::LOCALHOST));

        assert_eq!(
            Value::new("192.168.1.1").as_ip().unwrap().to_string(),
            "192.168.1.1"
        );
        assert_eq!(Value::new(" ::1 ").as_ip().unwrap().to_string(), "::1");

        let mut v6 = vec![0u8; 16];
        v6[15] = 1;
        assert_eq!(Value::new(v6).as_ip().unwrap().to_string(), "::1");
    }

    #[test]
    fn ip_round_trips_through_value() {
        let ip: IpAddr = "10.0.0.7".parse().unwrap();
        assert_eq!(Value::new(ip).as_ip().unwrap(), ip);
        assert_eq!(Value::new(ip).as_string(), "10.0.0.7");
    }

    #[test]
    fn ip_failures() {
        assert!(matches!(Value::new(()).as_ip(), Err(Error::NilValue)));
        assert!(matches!(
            Value::new(vec![1u8, 2, 3]).as_ip(),
            Err(Error::Parse { .. })
        ));
        assert!(matches!(Value::new(5i64).as_ip(), Err(Error::Parse { .. })));
    }

    #[test]
    fn mac_notations() {
        let expected = MacAddr::new([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
        for input in ["aa:bb:cc:dd:ee:ff", "AA-BB-CC-DD-EE-FF", "aabb.ccdd.eeff"] {
            assert_eq!(input.parse::<MacAddr>().unwrap(), expected, "{input:?}");
        }
        assert_eq!(expected.to_string(), "aa:bb:cc:dd:ee:ff");
    }

    #[test]
    fn mac_rejects_malformed_input() {
        for input in ["", "aa:bb:cc", "aa:bb:cc:dd:ee:fg", "aabbccddeeff", "a:b:c:d:e:f"] {
            assert!(input.parse::<MacAddr>().is_err(), "{input:?}");
        }
    }

    #[test]
    fn mac_rejects_longer_hardware_addresses() {
        for input in [
            "02:00:5e:10:00:00:00:01",
            "02-00-5e-10-00-00-00-01",
            "0200.5e10.0000.0001",
            "00:00:00:00:fe:80:00:00:00:00:00:00:02:00:5e:10:00:00:00:01",
        ] {
            assert!(input.parse::<MacAddr>().is_err(), "{input:?}");
        }
    }

    #[test]
    fn mac_from_value_goes_through_string_form() {
        let mac = Value::new("aa:bb:cc:dd:ee:ff").as_mac().unwrap();
        assert_eq!(mac.octets(), [0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
        // Stored values round-trip via their display string.
        assert_eq!(Value::new(mac).as_mac().unwrap(), mac);
        assert!(matches!(Value::new(()).as_mac(), Err(Error::NilValue)));
        assert!(Value::new(vec![1u8, 2, 3, 4, 5, 6]).as_mac().is_err());
    }
}
