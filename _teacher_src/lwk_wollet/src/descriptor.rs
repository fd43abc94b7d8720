use std::{fmt::Display, str::FromStr};

#[allow(deprecated)]
use aes_gcm_siv::aead::generic_array::GenericArray;
use aes_gcm_siv::Aes256GcmSiv;
use aes_gcm_siv::KeyInit;
use elements::bitcoin::secp256k1::SecretKey;
use elements::bitcoin::{bip32::ChildNumber, WitnessVersion};
use elements::hashes::{sha256t_hash_newtype, Hash};
use elements::{bitcoin, Address, AddressParams, Script};
use elements_miniscript::BtcDescriptor;
use elements_miniscript::DefiniteDescriptorKey;
use elements_miniscript::{
    confidential::Key,
    descriptor::{DescriptorSecretKey, Wildcard},
    ConfidentialDescriptor, Descriptor, DescriptorPublicKey, ForEachKey,
};
use serde::{Deserialize, Serialize};

use crate::{Error, EC};

sha256t_hash_newtype! {
    /// The tag of the hash
    pub struct EncryptionKeyTag = hash_str("LWK-FS-Encryption-Key/1.0");

    /// A tagged hash to generate the key for encryption in the encrypted file system persister
    #[hash_newtype(forward)]
    pub struct EncryptionKeyHash(_);
}

#[derive(Debug, Clone)]
#[allow(clippy::large_enum_variant)]
enum DescOrSpks {
    Desc(ConfidentialDescriptor<DescriptorPublicKey>),
    Spks(Vec<Spk>),
}

#[derive(Debug, Clone)]
struct Spk {
    blinding_key: Option<SecretKey>,
    script_pubkey: Script,
}

impl Display for Spk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.blinding_key {
            Some(key) => write!(f, "{}:{:x}", key.display_secret(), self.script_pubkey),
            None => write!(f, ":{:x}", self.script_pubkey),
        }
    }
}

impl FromStr for Spk {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key_hex, spk_hex) = s.split_once(':').ok_or(Error::InvalidSpkFormat)?;
        let blinding_key = if key_hex.is_empty() {
            None
        } else {
            Some(SecretKey::from_str(key_hex)?)
        };
        let script_pubkey = Script::from_str(spk_hex)?;
        Ok(Spk {
            blinding_key,
            script_pubkey,
        })
    }
}

#[derive(Debug, Clone)]
/// A wrapper that contains only the subset of CT descriptors handled by wollet
pub struct WolletDescriptor {
    inner: DescOrSpks,
    #[cfg(feature = "amp0")]
    is_amp0: bool,
}

impl Display for WolletDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            DescOrSpks::Desc(d) => Display::fmt(&d, f),
            DescOrSpks::Spks(spks) => {
                let parts: Vec<String> = spks.iter().map(|s| s.to_string()).collect();
                write!(f, "{}", parts.join(","))
            }
        }
    }
}

impl serde::Serialize for WolletDescriptor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for WolletDescriptor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl std::hash::Hash for WolletDescriptor {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}

impl PartialEq for WolletDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}

impl Eq for WolletDescriptor {}

#[cfg(feature = "amp0")]
fn desc_is_amp0(desc: &ConfidentialDescriptor<DescriptorPublicKey>) -> bool {
    use crate::amp0;
    use elements_miniscript::descriptor::{ShInner, Wildcard, WshInner};
    use elements_miniscript::miniscript::decode::Terminal;

    // ct(slip77(...),elsh(wsh(multi(2,server_xpub,user_xpub))))
    if let Key::Slip77(_) = desc.key {
        if let Descriptor::Sh(sh) = &desc.descriptor {
            if let ShInner::Wsh(wsh) = sh.as_inner() {
                if let WshInner::Ms(ms) = wsh.as_inner() {
                    if let Terminal::Multi(2, pks) = &ms.node {
                        if let [DescriptorPublicKey::XPub(xkey), _] = &pks[..] {
                            // server xpub [fp/3/gaitpath/amp_subaccount]xpub/*
                            // user xpub   [fp/3'/amp_subaccount']xpub/* (not checked)
                            if xkey.wildcard == Wildcard::Unhardened
                                && xkey.derivation_path.is_empty()
                            {
                                if let Some((fingerprint, server_path)) = &xkey.origin {
                                    let fp = fingerprint.to_string();
                                    let cn = ChildNumber::Normal { index: 3 };
                                    if server_path.len() == 34
                                        && server_path[0] == cn
                                        && (fp == amp0::AMP0_FINGERPRINT_MAINNET
                                            || fp == amp0::AMP0_FINGERPRINT_TESTNET
                                            || fp == amp0::AMP0_FINGERPRINT_REGTEST)
                                    {
                                        return true;
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
    false
}

impl TryFrom<ConfidentialDescriptor<DescriptorPublicKey>> for WolletDescriptor {
    type Error = Error;

    fn try_from(desc: ConfidentialDescriptor<DescriptorPublicKey>) -> Result<Self, Self::Error> {
        if let Key::Bare(_) = &desc.key {
            return Err(Self::Error::BlindingBareUnsupported);
        }
        if let Key::View(DescriptorSecretKey::MultiXPrv(_)) = &desc.key {
            return Err(Self::Error::BlindingViewMultiUnsupported);
        }
        if let Key::View(DescriptorSecretKey::XPrv(k)) = &desc.key {
            if k.wildcard != Wildcard::None {
                return Err(Self::Error::BlindingViewWildcardUnsupported);
            }
        }

        if desc.descriptor.is_multipath() {
            let descriptors = desc.descriptor.clone().into_single_descriptors()?;

            if descriptors.len() > 2 {
                return Err(Self::Error::UnsupportedMultipathDescriptor);
            }

            for (i, desc) in descriptors.iter().enumerate() {
                let r = desc.for_each_key(|k| {
                    if let Some(path) = k.full_derivation_path() {
                        if let Some(val) = path.into_iter().last() {
                            return val == &ChildNumber::from(i as u32);
                        }
                    }
                    false
                });
                if !r {
                    return Err(Self::Error::UnsupportedMultipathDescriptor);
                }
            }
        }

        #[cfg(feature = "amp0")]
        let is_amp0 = desc_is_amp0(&desc);

        // Support legacy p2sh multisig
        if let elements_miniscript::descriptor::DescriptorType::Sh = desc.descriptor.desc_type() {
            if desc.descriptor.to_string().starts_with("elsh(multi(") {
                return Ok(WolletDescriptor {
                    inner: DescOrSpks::Desc(desc),
                    #[cfg(feature = "amp0")]
                    is_amp0,
                });
            }
        }

        match desc.descriptor.desc_type().segwit_version() {
            None => Err(Self::Error::UnsupportedDescriptorPreSegwit),
            Some(WitnessVersion::V0) => Ok(WolletDescriptor {
                inner: DescOrSpks::Desc(desc),
                #[cfg(feature = "amp0")]
                is_amp0,
            }),
            Some(WitnessVersion::V1) => Ok(WolletDescriptor {
                inner: DescOrSpks::Desc(desc),
                #[cfg(feature = "amp0")]
                is_amp0,
            }),
            Some(_) => Err(Self::Error::UnsupportedDescriptorSegwitUnknownVersion),
        }
    }
}

impl FromStr for WolletDescriptor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match ConfidentialDescriptor::<DescriptorPublicKey>::from_str(s) {
            Ok(desc) => desc.try_into(),
            Err(first_err) => {
                // Try parsing as comma-separated "blinding_key_hex:spk_hex" pairs
                let spks: Result<Vec<Spk>, _> = s.split(',').map(Spk::from_str).collect();
                match spks {
                    Ok(spks) if !spks.is_empty() => Ok(WolletDescriptor {
                        inner: DescOrSpks::Spks(spks),
                        #[cfg(feature = "amp0")]
                        is_amp0: false,
                    }),
                    _ => Err(first_err.into()),
                }
            }
        }
    }
}

/// The chain can be either External or Internal.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy, PartialOrd, Ord)]
pub enum Chain {
    /// External address, shown when asked for a payment.
    /// Wallet having a single descriptor are considered External
    External,

    /// Internal address, used for the change
    Internal,
}

impl TryFrom<&Descriptor<DescriptorPublicKey>> for Chain {
    type Error = ();

    fn try_from(value: &Descriptor<DescriptorPublicKey>) -> Result<Self, Self::Error> {
        let mut ext_int = None;
        // TODO: error if multiple keys have different derivation path

        let has_wildcard = value.has_wildcard();

        value.for_each_key(|k| {
            if let Some(path) = k.full_derivation_path() {
                if has_wildcard {
                    ext_int = path.into_iter().last().cloned();
                } else {
                    ext_int = path.into_iter().nth_back(1).cloned();
                }
            }
            false
        });
        match ext_int {
            None => Err(()),
            Some(ext_int) => Ok(ext_int.try_into()?),
        }
    }
}
impl TryFrom<ChildNumber> for Chain {
    type Error = ();

    fn try_from(value: ChildNumber) -> Result<Self, Self::Error> {
        match value {
            ChildNumber::Normal { index: 0 } => Ok(Chain::External),
            ChildNumber::Normal { index: 1 } => Ok(Chain::Internal),
            _ => Err(()),
        }
    }
}

impl TryFrom<&ConfidentialDescriptor<DescriptorPublicKey>> for Chain {
    type Error = ();

    fn try_from(value: &ConfidentialDescriptor<DescriptorPublicKey>) -> Result<Self, Self::Error> {
        (&value.descriptor).try_into()
    }
}

impl WolletDescriptor {
    /// Return a reference to the underlying descriptor.
    pub fn descriptor(&self) -> Result<&Descriptor<DescriptorPublicKey>, Error> {
        match &self.inner {
            DescOrSpks::Desc(d) => Ok(&d.descriptor),
            DescOrSpks::Spks(_) => Err(Error::UnsupportedWithoutDescriptor),
        }
    }

    /// Return a reference to the underlying CT descriptor.
    pub fn ct_descriptor(&self) -> Result<&ConfidentialDescriptor<DescriptorPublicKey>, Error> {
        match &self.inner {
            DescOrSpks::Desc(d) => Ok(d),
            DescOrSpks::Spks(_) => Err(Error::UnsupportedWithoutDescriptor),
        }
    }

    /// Return the descriptor URL encoded to be used as part of an URL
    pub fn url_encoded_descriptor(&self) -> Result<String, Error> {
        match &self.inner {
            DescOrSpks::Desc(d) => Ok(url_encode_descriptor(&d.to_string())),
            DescOrSpks::Spks(_) => Err(Error::UnsupportedWithoutDescriptor),
        }
    }

    /// Return the [ELIP152](https://github.com/ElementsProject/ELIPs/blob/main/elip-0152.mediawiki) deterministic wallet identifier.
    pub fn dwid(&self, network: lwk_common::Network) -> Result<String, Error> {
        let index = (1 << 31) - 1; // 2^31 - 1

        // Use the Elements network address parameters
        let params = network.address_params();
        let address = self.address(index, params)?;
        let address_str = address.to_string();
        let hash = elements::hashes::sha256::Hash::hash(address_str.as_bytes());
        let hash_hex = hash.to_string();

        // Take only the first half of the hash (32 hex characters = 16 bytes)
        let half_hash = &hash_hex[..32];

        // Format with hyphens every 4 characters
        let formatted = half_hash
            .chars()
            .collect::<Vec<_>>()
            .chunks(4)
            .map(|c| c.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("-");

        Ok(formatted)
    }

    /// Return wether the descriptor has a blinding key derived with [Elip151](https://github.com/ElementsProject/ELIPs/blob/main/elip-0151.mediawiki)
    pub fn is_elip151(&self) -> bool {
        match &self.inner {
            DescOrSpks::Desc(d) => {
                if let Ok(elip151_key) = Key::from_elip151(&d.descriptor) {
                    elip151_key == d.key
                } else {
                    false
                }
            }
            DescOrSpks::Spks(_) => false,
        }
    }

    /// Strip key origin information from the bitcoin descriptor and return it without checksum
    pub fn bitcoin_descriptor_without_key_origin(&self) -> Result<String, Error> {
        match &self.inner {
            DescOrSpks::Desc(d) => {
                let desc = d.descriptor.to_string();
                let mut result = String::with_capacity(desc.len());
                let mut skip = false;
                for c in desc.chars() {
                    if skip {
                        if c == ']' {
                            skip = false;
                        }
                    } else if c == '[' || c == '#' {
                        skip = true;
                    } else {
                        result.push(c)
                    }
                }
                Ok(result)
            }
            DescOrSpks::Spks(_) => Err(Error::UnsupportedWithoutDescriptor),
        }
    }

    /// return the single descriptor if not multipath, if multipath returns the internal or the
    /// external descriptor accordint to `int_or_ext`
    fn inner_descriptor_if_available(&self, ext_int: Chain) -> Result<WolletDescriptor, Error> {
        match &self.inner {
            DescOrSpks::Desc(d) => {
                let mut descriptors = d
                    .descriptor
                    .clone()
                    .into_single_descriptors()
                    .expect("already done in TryFrom");
                assert_ne!(descriptors.len(), 0);
                let descriptor = if descriptors.len() == 1 {
                    descriptors.pop().expect("inside len==1 branch")
                } else {
                    match ext_int {
                        Chain::External => descriptors.remove(0),
                        Chain::Internal => descriptors.remove(1),
                    }
                };
                let inner = ConfidentialDescriptor {
                    key: d.key.clone(),
                    descriptor,
                };
                Ok(WolletDescriptor {
                    inner: DescOrSpks::Desc(inner),
                    #[cfg(feature = "amp0")]
                    is_amp0: self.is_amp0,
                })
            }
            DescOrSpks::Spks(_) => Err(Error::UnsupportedWithoutDescriptor),
        }
    }

    fn is_multipath(&self) -> bool {
        match &self.inner {
            DescOrSpks::Desc(d) => d.descriptor.is_multipath(),
            DescOrSpks::Spks(_) => false,
        }
    }

    /// Derive the single path descriptors of this descriptor if it's multipath.
    /// If it's not multipath, return the descriptor itself as a single element.
    pub fn single_bitcoin_descriptors(&self) -> Result<Vec<String>, Error> {
        let d = self.inner_descriptor_if_available(Chain::External)?;
        let d = to_bitcoin_descriptor(&d.descriptor()?.to_string());
        let mut v = vec![d];
        if self.is_multipath() {
            let d = self.inner_descriptor_if_available(Chain::Internal)?;
            let d = to_bitcoin_descriptor(&d.descriptor()?.to_string());
            v.push(d);
        }
        Ok(v)
    }

    /// Derive a change address from this descriptor at the given `index`.
    pub fn change(&self, index: u32, params: &'static AddressParams) -> Result<Address, Error> {
        self.inner_address(index, params, Chain::Internal)
    }

    /// Get a cipher from the descriptor, used to encrypt and decrypt updates.
    ///
    /// The rationale to derive a key from the descriptor is to avoid storing a separate key that you need to backup for the wallet data.
    /// In the end the descriptor allows you to recover the same data directly from the blockchain, thus we don't need additional security.
    #[allow(deprecated)]
    pub fn cipher(&self) -> Aes256GcmSiv {
        let key_bytes = EncryptionKeyHash::hash(self.to_string().as_bytes()).to_byte_array();
        let key = GenericArray::from_slice(&key_bytes);
        Aes256GcmSiv::new(key)
    }

    /// Derive an address from this descriptor at the given `index`.
    pub fn address(&self, index: u32, params: &'static AddressParams) -> Result<Address, Error> {
        self.inner_address(index, params, Chain::External)
    }

    fn at_derivation_index(
        &self,
        index: u32,
    ) -> Result<ConfidentialDescriptor<DefiniteDescriptorKey>, Error> {
        match &self.inner {
            DescOrSpks::Desc(d) => Ok(d.at_derivation_index(index)?),
            DescOrSpks::Spks(_) => Err(Error::UnsupportedWithoutDescriptor),
        }
    }

    fn inner_address(
        &self,
        index: u32,
        params: &'static AddressParams,
        ext_int: Chain,
    ) -> Result<Address, Error> {
        #[cfg(feature = "amp0")]
        if self.is_amp0 {
            return Err(Error::Amp0AddressError);
        }
        match &self.inner {
            DescOrSpks::Spks(spks) => {
                let spk = spks.get(index as usize).ok_or(Error::IndexOutOfRange)?;
                let blinding_pk = spk.blinding_key.as_ref().map(|k| k.public_key(&EC));
                Address::from_script(&spk.script_pubkey, blinding_pk, params)
                    .ok_or(Error::UnsupportedWithoutDescriptor)
            }
            _ => Ok(self
                .inner_descriptor_if_available(ext_int)?
                .at_derivation_index(index)?
                .address(&EC, params)?),
        }
    }

    #[cfg(feature = "amp0")]
    pub(crate) fn amp0_address(
        &self,
        index: u32,
        params: &'static AddressParams,
    ) -> Result<Address, Error> {
        Ok(self.at_derivation_index(index)?.address(&EC, params)?)
    }

    /// Get a scriptpubkey
    pub fn script_pubkey(&self, ext_int: Chain, index: u32) -> Result<Script, Error> {
        match &self.inner {
            DescOrSpks::Spks(spks) => spks
                .get(index as usize)
                .map(|s| s.script_pubkey.clone())
                .ok_or(Error::IndexOutOfRange),
            _ => Ok(self
                .inner_descriptor_if_available(ext_int)?
                .at_derivation_index(index)?
                .descriptor
                .script_pubkey()),
        }
    }

    /// Get a definite descriptor
    pub fn definite_descriptor(
        &self,
        ext_int: Chain,
        index: u32,
    ) -> Result<Descriptor<DefiniteDescriptorKey>, Error> {
        let desc = self.inner_descriptor_if_available(ext_int)?;
        Ok(desc.descriptor()?.at_derivation_index(index)?)
    }

    /// Get a CT definite descriptor
    pub(crate) fn ct_definite_descriptor(
        &self,
        ext_int: Chain,
        index: u32,
    ) -> Result<ConfidentialDescriptor<DefiniteDescriptorKey>, Error> {
        self.inner_descriptor_if_available(ext_int)?
            .at_derivation_index(index)
    }

    /// Try also to parse it as a non-multipath descriptor specified on 2 lines,
    /// like the format exported by the Green Wallet
    pub fn from_str_relaxed(desc: &str) -> Result<WolletDescriptor, Error> {
        match WolletDescriptor::from_str(desc) {
            Ok(d) => Ok(d),
            Err(e) => parse_multiline(desc).ok_or(e),
        }
    }

    /// Returns true if all the xpubs in the descriptors are for mainnet
    pub fn is_mainnet(&self) -> bool {
        match &self.inner {
            DescOrSpks::Desc(d) => d.descriptor.for_each_key(|k| match k {
                DescriptorPublicKey::XPub(x) => {
                    x.xkey.network == elements::bitcoin::NetworkKind::Main
                }
                DescriptorPublicKey::MultiXPub(x) => {
                    x.xkey.network == elements::bitcoin::NetworkKind::Main
                }
                DescriptorPublicKey::Single(_) => true,
            }),
            _ => false,
        }
    }

    /// Return a bitcoin pegin address, btc sent to this address can be redeemed as lbtc
    pub fn pegin_address(
        &self,
        index: u32,
        network: bitcoin::Network,
        fed_desc: BtcDescriptor<bitcoin::PublicKey>,
    ) -> Result<bitcoin::Address, Error> {
        let our_desc = self
            .definite_descriptor(Chain::External, index)?
            .derived_descriptor(&EC)?;
        let pegin = elements_miniscript::descriptor::pegin::Pegin::new(fed_desc, our_desc);
        let pegin_script = pegin.bitcoin_witness_script(&EC)?;
        let pegin_address = bitcoin::Address::p2wsh(&pegin_script, network);
        Ok(pegin_address)
    }

    pub(crate) fn as_single_descriptors(
        &self,
    ) -> Result<Vec<ConfidentialDescriptor<DescriptorPublicKey>>, Error> {
        match &self.inner {
            DescOrSpks::Desc(d) => {
                let descriptors = d.descriptor.clone().into_single_descriptors()?;
                let mut result = Vec::with_capacity(descriptors.len());
                for descriptor in descriptors {
                    result.push(ConfidentialDescriptor {
                        key: d.key.clone(),
                        descriptor,
                    });
                }
                Ok(result)
            }
            DescOrSpks::Spks(_) => Err(Error::UnsupportedWithoutDescriptor),
        }
    }

    /// Return the blinding secret key for the given script pubkey.
    pub(crate) fn blinding_key_for_script(&self, script_pubkey: &Script) -> Option<SecretKey> {
        match &self.inner {
            DescOrSpks::Desc(d) => lwk_common::derive_blinding_key(d, script_pubkey),
            DescOrSpks::Spks(spks) => spks
                .iter()
                .find(|s| s.script_pubkey == *script_pubkey)
                .and_then(|s| s.blinding_key),
        }
    }

    /// Whether this descriptor has a wildcard. A descriptor without a wildcard is a single address descriptor.
    pub fn has_wildcard(&self) -> bool {
        match &self.inner {
            DescOrSpks::Desc(d) => d.descriptor.has_wildcard(),
            DescOrSpks::Spks(_) => false,
        }
    }

    /// Whether this descriptor is a AMP0 descriptor
    #[cfg(feature = "amp0")]
    pub fn is_amp0(&self) -> bool {
        self.is_amp0
    }

    /// Mark the descriptor as not AMP0
    ///
    /// Calling this function improperly might lead to loss of funds.
    /// Do not call this function unless you know what you are doing.
    ///
    /// The chance that someone will actually need this function is
    /// extremely unlikely.
    #[cfg(feature = "amp0")]
    pub fn dangerous_this_wallet_is_not_amp0(&mut self) {
        self.is_amp0 = false;
    }
}

// try to parse as multiline descriptor as exported in green
fn parse_multiline(desc: &str) -> Option<WolletDescriptor> {
    let lines: Vec<_> = desc.trim().split('\n').collect();
    if lines.len() != 2 {
        return None;
    }
    let first_str = lines[0].trim();
    let second_str = lines[1].trim();
    let first = ConfidentialDescriptor::<DescriptorPublicKey>::from_str(first_str);
    let second = ConfidentialDescriptor::<DescriptorPublicKey>::from_str(second_str);
    if first.is_err() || second.is_err() {
        return None;
    }
    let first_no_chk = remove_checksum_if_any(first_str);
    let second_no_chk = remove_checksum_if_any(second_str);
    if first_no_chk.replace("/0/*", "/1/*") != second_no_chk {
        return None;
    }
    let combined = first_no_chk.replace("/0/*", "/<0;1>/*");
    WolletDescriptor::from_str(&combined).ok()
}

fn remove_checksum_if_any(s: &str) -> String {
    s.split('#')
        .next()
        .map(|e| e.to_string())
        .expect("even if '#' is not there we always have one element")
}

fn to_bitcoin_descriptor(s: &str) -> String {
    let s = remove_checksum_if_any(&s[2..]);
    let c = elements_miniscript::descriptor::checksum::desc_checksum(&s).unwrap_or("".into());
    format!("{s}#{c}")
}

/// Simple URL encoding for common characters found in Bitcoin descriptors
pub(crate) fn url_encode_descriptor(desc: &str) -> String {
    desc.chars()
        .map(|c| match c {
            '(' => "%28".to_string(),
            ')' => "%29".to_string(),
            '[' => "%5B".to_string(),
            ']' => "%5D".to_string(),
            '{' => "%7B".to_string(),
            '}' => "%7D".to_string(),
            '/' => "%2F".to_string(),
            '*' => "%2A".to_string(),
            ',' => "%2C".to_string(),
            '%' => "%25".to_string(),
            '&' => "%26".to_string(),
            '#' => "%23".to_string(),
            '+' => "%2B".to_string(),
            '\'' => "%27".to_string(),
            '<' => "%3C".to_string(),
            '>' => "%3E".to_string(),
            ';' => "%3B".to_string(),
            ' ' => "%20".to_string(),
            c => c.to_string(),
        })
        .collect()
}


#[test]
fn test_elip_dwid() {
    // Generate ELIP test vectors with
    // cargo test -p lwk_wollet elip_dwid -- --nocapture
    use lwk_common::{Bip, Network, Signer};
    use lwk_signer::SwSigner;
    let mnemonic = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
    let bip = Bip::Bip84;
    let signer = SwSigner::new(mnemonic, true).unwrap();
    let signer_test = SwSigner::new(mnemonic, false).unwrap();
    let ko_xpub = signer.keyorigin_xpub(bip, true).unwrap();
    let ko_xpub_test = signer_test.keyorigin_xpub(bip, false).unwrap();
    let view = "3e129856c574c66d94023ac98b7f69aca9774d10aee4dc087f0c52a498687189";
    let view_151 = "9fc48763c2aa01aa7b26edb3c8e32f709e4a6b5a83d4379c85864c7e613c5d65";
    let xpub = &ko_xpub[23..];
    let mut i = 0;
    for (descriptor, description, network) in [
        (
            format!("ct({view},elwpkh({ko_xpub}/0/*))"),
            "Liquid",
            Network::Liquid,
        ),
        (
            format!("ct({view},elwpkh({ko_xpub_test}/0/*))"),
            "Liquid Testnet",
            Network::TestnetLiquid,
        ),
        (
            format!("ct({view},elwpkh({ko_xpub_test}/0/*))"),
            "Liquid Regtest",
            Network::LocaltestLiquid,
        ),
        (
            format!("ct({view},elwpkh({xpub}/0/*))"),
            "equivalent descriptor",
            Network::Liquid,
        ),
        (
            format!("ct({view},elwpkh({ko_xpub}/<0;1>/*))"),
            "multi-path",
            Network::Liquid,
        ),
        (
            format!("ct(elip151,elwpkh({ko_xpub}/0/*))"),
            "different blinding key",
            Network::Liquid,
        ),
        (
            format!("ct({view_151},elwpkh({ko_xpub}/0/*))"),
            "equivalent blinding key",
            Network::Liquid,
        ),
        (
            format!("ct({view},elwpkh({ko_xpub}/0))"),
            "no wildcard",
            Network::Liquid,
        ),
        (
            format!("ct({view},elwpkh({ko_xpub}/0/2147483647))"),
            "explicit index 2^31-1",
            Network::Liquid,
        ),
    ] {
        i += 1;
        let d: WolletDescriptor = descriptor.parse().unwrap();
        let dwid = d.dwid(network).unwrap();
        let network_str = match network {
            Network::Liquid => "Liquid",
            Network::TestnetLiquid => "Liquid Testnet",
            Network::LocaltestLiquid => "Liquid Regtest",
        };
        println!("* Test Vector {i}");
        println!("** Description: {description}");
        println!("** Network: {network_str}");
        println!("** CT Descriptor: <code>{descriptor}</code>");
        println!("** DWID: <code>{dwid}</code>\n");
    }
}
