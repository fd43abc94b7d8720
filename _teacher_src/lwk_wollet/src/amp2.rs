//! Create and use AMP2 wallets.
//!
//! AMP2 is a service that allows issuers to create and manage authorized assets.
//!
//! If you want to receive an AMP2 asset, you need create and register an AMP2 wallet.
//! When you want to send an AMP2 asset, you need ask AMP2 to cosign the transaction, so that AMP2
//! can enforce the authorization rules.
//!
//! <div class="warning">
//! AMP2 is under development, expect breaking changes.
//! </div>

use crate::WolletDescriptor;
use elements::bitcoin::bip32::{KeySource, Xpub};

pub const FINGERPRINT_TESTNET: &str = "3d970d04";
pub const XPUB_TESTNET: &str = "tpubDC347GyKEGtyd4swZDaEmBTcNuqseyX7E3Yw58FoeV1njuBcUmBMr5vBeBh6eRsxKYHeCAEkKj8J2p2dBQQJwB8n33uyAPrdgwFxLFTCXRd";
pub const DERIVATION_PATH_TESTNET: &str = "m/87h/1h/0h";
pub const KEYORIGIN_XPUB_TESTNET: &str = "[3d970d04/87h/1h/0h]tpubDC347GyKEGtyd4swZDaEmBTcNuqseyX7E3Yw58FoeV1njuBcUmBMr5vBeBh6eRsxKYHeCAEkKj8J2p2dBQQJwB8n33uyAPrdgwFxLFTCXRd";
pub const URL_TESTNET: &str = "https://amp2.testnet.blockstream.com/";

/// AMP2 wallet
pub struct Amp2Wallet {
    descriptor: WolletDescriptor,
    #[allow(unused)]
    url: String,
}

impl Amp2Wallet {
    /// AMP2 wallet for Liquid Testnet
    pub fn new_testnet(user_keysource: KeySource, user_xpub: Xpub) -> Self {
        // TODO: allow to set custom blinding key
        let k = "slip77(0684e43749a3a3eb0362dcef8c66994bd51d33f8ce6b055126a800a626fc0d67)";
        let amp2_xpub = KEYORIGIN_XPUB_TESTNET;
        let user_xpub = format!("[{}/{}]{}", user_keysource.0, user_keysource.1, user_xpub);
        let s = format!("ct({k},elwsh(multi(2,{amp2_xpub}/<0;1>/*,{user_xpub}/<0;1>/*)))");
        let descriptor: WolletDescriptor = s.parse().expect("fixed descriptor structure");
        Self {
            descriptor,
            url: URL_TESTNET.into(),
        }
    }

    pub fn descriptor(&self) -> WolletDescriptor {
        self.descriptor.clone()
    }
}
