use serde::{Deserialize, Serialize};


/// Which LDAP attributes hold the user's identity fields.
///
/// Loading a document never fills these in; only the setup wizard supplies
/// defaults (see [`LdapMappings::wizard_defaults`]).
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct LdapMappings {
    pub dn: String,
    pub mail: String,
    pub uid: String,
    pub cn: String,
}

impl LdapMappings {
    pub const DEFAULT_DN: &'static str = "dn";
    pub const DEFAULT_MAIL: &'static str = "mail";
    pub const DEFAULT_UID: &'static str = "uid";
    pub const DEFAULT_CN: &'static str = "cn";

    pub fn wizard_defaults() -> Self {
        Self {
            dn: Self::DEFAULT_DN.to_string(),
            mail: Self::DEFAULT_MAIL.to_string(),
            uid: Self::DEFAULT_UID.to_string(),
            cn: Self::DEFAULT_CN.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.dn.is_empty() && self.mail.is_empty() && self.uid.is_empty() && self.cn.is_empty()
    }
}
