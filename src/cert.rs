//! # Entity Certificates
//!
//! Typed access to the key material carried by entity certificates.
//!
//! Certificate *contents* are opaque byte blobs to the message layer; this
//! module only models the decoded key fields the protocol engine needs. The
//! two variants are statically dispatched through [`EntityCertificate`]:
//! a public certificate knows an entity's public keys, a private certificate
//! additionally holds the matching private halves.

use crate::crypto::{KEY_SIZE, PUBLIC_KEY_SIZE};
use uuid::Uuid;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Capability set common to both certificate variants.
pub trait EntityCertificate {
    /// Artifact id of the entity this certificate describes.
    fn artifact_id(&self) -> Uuid;

    /// Public key used for key agreement / encryption.
    fn public_encryption_key(&self) -> &[u8; PUBLIC_KEY_SIZE];

    /// Public key used for signature verification.
    fn public_signing_key(&self) -> &[u8; PUBLIC_KEY_SIZE];
}

/// Certificate for a peer entity: public key material only.
#[derive(Debug, Clone)]
pub struct PublicEntityCertificate {
    artifact_id: Uuid,
    public_encryption_key: [u8; PUBLIC_KEY_SIZE],
    public_signing_key: [u8; PUBLIC_KEY_SIZE],
}

impl PublicEntityCertificate {
    pub fn new(
        artifact_id: Uuid,
        public_encryption_key: [u8; PUBLIC_KEY_SIZE],
        public_signing_key: [u8; PUBLIC_KEY_SIZE],
    ) -> Self {
        Self {
            artifact_id,
            public_encryption_key,
            public_signing_key,
        }
    }
}

impl EntityCertificate for PublicEntityCertificate {
    fn artifact_id(&self) -> Uuid {
        self.artifact_id
    }

    fn public_encryption_key(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.public_encryption_key
    }

    fn public_signing_key(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.public_signing_key
    }
}

/// Certificate for this entity: public halves plus the private keys used to
/// authenticate as that entity. Private keys are zeroed on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PrivateEntityCertificate {
    #[zeroize(skip)]
    artifact_id: Uuid,
    public_encryption_key: [u8; PUBLIC_KEY_SIZE],
    public_signing_key: [u8; PUBLIC_KEY_SIZE],
    private_encryption_key: [u8; KEY_SIZE],
    private_signing_key: [u8; KEY_SIZE],
}

impl PrivateEntityCertificate {
    pub fn new(
        artifact_id: Uuid,
        public_encryption_key: [u8; PUBLIC_KEY_SIZE],
        public_signing_key: [u8; PUBLIC_KEY_SIZE],
        private_encryption_key: [u8; KEY_SIZE],
        private_signing_key: [u8; KEY_SIZE],
    ) -> Self {
        Self {
            artifact_id,
            public_encryption_key,
            public_signing_key,
            private_encryption_key,
            private_signing_key,
        }
    }

    pub fn private_encryption_key(&self) -> &[u8; KEY_SIZE] {
        &self.private_encryption_key
    }

    pub fn private_signing_key(&self) -> &[u8; KEY_SIZE] {
        &self.private_signing_key
    }
}

impl EntityCertificate for PrivateEntityCertificate {
    fn artifact_id(&self) -> Uuid {
        self.artifact_id
    }

    fn public_encryption_key(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.public_encryption_key
    }

    fn public_signing_key(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.public_signing_key
    }
}
