use tracing::warn;

use crate::{
    configuration::traits::ResolvableConfiguration,
    secrets::{decode_secret_tolerant, CookieCodec, CookieError, DecodedSecret},
};


/// The base64 `cookie_hash` / `cookie_encryption` pair of a document.
#[derive(Debug, Clone, Copy)]
pub(super) struct UnresolvedCookieSecrets<'a> {
    pub(super) hash: &'a str,
    pub(super) encryption: &'a str,
}

impl ResolvableConfiguration for UnresolvedCookieSecrets<'_> {
    type Resolved = CookieCodec;
    type Error = CookieError;

    fn resolve(self) -> Result<Self::Resolved, Self::Error> {
        let hash_key = match decode_secret_tolerant(self.hash) {
            DecodedSecret::Decoded(bytes) => bytes,
            fallback => {
                warn!(
                    ?fallback,
                    "cookie_hash is unusable, session cookies are signed with an all-zero key."
                );
                fallback.into_bytes()
            }
        };

        let encryption_key = decode_secret_tolerant(self.encryption).into_bytes();
        let encryption_key = (!encryption_key.is_empty()).then_some(encryption_key.as_slice());

        CookieCodec::new(&hash_key, encryption_key)
    }
}
