//! String constants sent and received by Resource Manager APIs
//!
//! Azure adds values to its enums without bumping API versions, so parsing
//! is best-effort: a value that isn't known becomes `Other` and is sent
//! back untouched.

/// Declares an enum over the string values an API accepts.
///
/// ```ignore
/// string_enum! {
///     pub enum SkuName {
///         Standard => "standard",
///         Free => "free",
///     }
/// }
/// ```
#[macro_export]
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident => $value:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant,)+
            /// A value Azure returned that isn't listed above.
            Other(String),
        }

        impl $name {
            pub fn possible_values() -> Vec<&'static str> {
                vec![$($value),+]
            }

            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $value,)+
                    Self::Other(value) => value.as_str(),
                }
            }

            /// Case-insensitive lookup; unknown values are kept as `Other`.
            pub fn parse(input: &str) -> Self {
                $(
                    if input.eq_ignore_ascii_case($value) {
                        return Self::$variant;
                    }
                )+
                Self::Other(input.to_string())
            }

            pub fn is_known(&self) -> bool {
                !matches!(self, Self::Other(_))
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = ::std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self::parse(s))
            }
        }

        impl $crate::__serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: $crate::__serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> $crate::__serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: $crate::__serde::Deserializer<'de>,
            {
                let value = <String as $crate::__serde::Deserialize>::deserialize(deserializer)?;
                Ok(Self::parse(&value))
            }
        }
    };
}

crate::string_enum! {
    /// Whether a resource accepts traffic from public networks.
    pub enum PublicNetworkAccess {
        Enabled => "Enabled",
        Disabled => "Disabled",
    }
}

crate::string_enum! {
    pub enum CreatedByType {
        Application => "Application",
        Key => "Key",
        ManagedIdentity => "ManagedIdentity",
        User => "User",
    }
}
