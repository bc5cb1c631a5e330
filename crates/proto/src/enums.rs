//! Enumerations carried as varint fields
//!
//! Values written by a newer producer that this build does not know are kept
//! as `Unrecognized(raw)` so re-encoding reproduces the original bytes.

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// Value not known to this build
            Unrecognized(u64),
        }

        impl $name {
            /// Wire value of this variant
            pub fn as_u64(self) -> u64 {
                match self {
                    $( $name::$variant => $value, )+
                    $name::Unrecognized(raw) => raw,
                }
            }

            /// Human-readable name
            pub fn name(self) -> &'static str {
                match self {
                    $( $name::$variant => stringify!($variant), )+
                    $name::Unrecognized(_) => "Unrecognized",
                }
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                match raw {
                    $( $value => $name::$variant, )+
                    other => $name::Unrecognized(other),
                }
            }
        }

        impl From<$name> for u64 {
            fn from(value: $name) -> u64 {
                value.as_u64()
            }
        }
    };
}

wire_enum! {
    /// Algorithm used for the header and payload checksums
    pub enum ChecksumType {
        /// CRC-32 with the IEEE polynomial
        #[default]
        Crc32Ieee = 0,
        /// HighwayHash
        Highway = 1,
    }
}

wire_enum! {
    /// Compression applied to the snapshot payload
    pub enum CompressionType {
        /// Payload stored as-is
        #[default]
        NoCompression = 0,
        /// Snappy block compression
        Snappy = 1,
    }
}

wire_enum! {
    /// Kind of a replicated log entry
    pub enum EntryType {
        /// Application command
        #[default]
        Application = 0,
        /// Membership change
        ConfigChange = 1,
        /// Application command with an encoded (compressed) payload
        Encoded = 2,
        /// Internal bookkeeping entry
        Metadata = 3,
    }
}
