use alloc::vec::Vec;
use core::ops::Range;
use log::{debug, trace, warn};

use super::{
    classification::Classification,
    counter::{CounterStorage, ReplayCounterStore},
    crypto::{self, BLOCK_LEN},
    error::Error,
    inspect::PayloadInspector,
    keys::{KeyLookup, PresharedKey},
    Result,
};
use crate::{
    coap::{
        self, option::MAX_BLOCK_SIZE, Decoded, EncryptionAlgorithm, Message,
        Serialized,
    },
    config::Config,
};

/// Seals outgoing and classifies incoming messages.
///
/// Outgoing messages get the client identity, the replay counters and a tag
/// placeholder attached, their payload encrypted, and the tag computed over
/// the final datagram. Incoming datagrams have their tag verified, their
/// payload decrypted and inspected, resulting in a [`Classification`].
pub struct SecurityEnvelope<K, I, S> {
    config: Config,
    keys: K,
    inspector: I,
    counters: ReplayCounterStore<S>,
}

impl<K, I, S> SecurityEnvelope<K, I, S>
where
    K: KeyLookup,
    I: PayloadInspector,
    S: CounterStorage,
{
    /// Creates a new `SecurityEnvelope`.
    ///
    /// # Arguments
    /// * `config` - Feature switches and limits, validated here.
    /// * `keys` - The pre-shared keys of the client identities.
    /// * `inspector` - Decides whether a received payload is clean.
    /// * `storage` - Durable storage of the boot counter.
    pub fn new(
        config: Config,
        keys: K,
        inspector: I,
        storage: S,
    ) -> Result<SecurityEnvelope<K, I, S>> {
        config.validate()?;
        let counters =
            ReplayCounterStore::new(storage, config.boot_counter_cache_reads);

        Ok(SecurityEnvelope {
            config,
            keys,
            inspector,
            counters,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn counters(&self) -> &ReplayCounterStore<S> {
        &self.counters
    }

    pub fn counters_mut(&mut self) -> &mut ReplayCounterStore<S> {
        &mut self.counters
    }

    /// Increments the boot counter, which is done once when the node
    /// initializes its connection. Returns the new value.
    pub fn init_connection(&mut self) -> u16 {
        self.counters.on_boot()
    }

    /// Seals and serializes a message for its first transmission.
    pub fn serialize(&mut self, message: &Message) -> Result<Vec<u8>> {
        self.serialize_with_counter(message, 0)
    }

    /// Seals and serializes a message, with `retransmission_counter` being
    /// the number of times it has been sent before.
    pub fn serialize_with_counter(
        &mut self,
        message: &Message,
        retransmission_counter: u8,
    ) -> Result<Vec<u8>> {
        let mut sealed = message.clone();
        self.seal(&mut sealed, retransmission_counter)?;

        let Serialized { mut bytes, tag } =
            coap::serialize_message(&sealed, self.config.max_header_size)?;
        if let Some(tag) = tag {
            let identity = sealed
                .client_identity
                .unwrap_or(self.config.client_identity);
            let key = self.key(identity)?;
            crypto::write_tag(key.as_bytes(), &mut bytes, tag)?;
            trace!(
                "Tagged message {} with key {}",
                sealed.message_id,
                identity
            );
        }

        Ok(bytes)
    }

    /// Parses a datagram that has been serialized before and serializes it
    /// again for a retransmission, with fresh counters, tag and ciphertext.
    pub fn reseal(
        &mut self,
        datagram: &[u8],
        retransmission_counter: u8,
    ) -> Result<Vec<u8>> {
        let (message, classification) = self.parse(datagram)?;
        debug!(
            "Resealing message {} ({})",
            message.message_id, classification
        );
        self.serialize_with_counter(&message, retransmission_counter)
    }

    /// Parses a datagram and classifies how far it can be trusted.
    ///
    /// Only malformed datagrams are errors. Whether the message should be
    /// processed is up to the caller, based on the classification.
    pub fn parse(&self, datagram: &[u8]) -> Result<(Message, Classification)> {
        let Decoded { mut message, tag } =
            coap::parse_message(datagram, self.max_wire_payload())?;

        if self.config.encryption {
            // One byte of every block is reserved for padding
            if let Some(block2) = message.block2.as_mut() {
                block2.size = block2.size.saturating_sub(1);
            }
        }

        let mut tag_valid = self.verify(&message, datagram, tag);
        let was_encrypted = self.was_encrypted(&message);
        if self.config.encryption
            && message.encryption == Some(EncryptionAlgorithm::Aes128Padded)
            && !message.payload.is_empty()
            && !self.decrypt(&mut message)
        {
            tag_valid = false;
        }
        let content_clean = self.inspect(&message);

        let classification = Classification::from_checks(
            tag_valid,
            content_clean,
            was_encrypted,
        );
        debug!(
            "Message {} classified as {:?}",
            message.message_id, classification
        );

        Ok((message, classification))
    }

    /// Attaches the security options and encrypts the payload.
    fn seal(
        &mut self,
        message: &mut Message,
        retransmission_counter: u8,
    ) -> Result<()> {
        let identity = message
            .client_identity
            .unwrap_or(self.config.client_identity);

        if message.payload.len() > self.config.max_chunk_size {
            warn!(
                "Payload of {} B truncated to {} B",
                message.payload.len(),
                self.config.max_chunk_size
            );
            message.payload.truncate(self.config.max_chunk_size);
        }

        if self.config.integrity {
            message.client_identity = Some(identity);
            message.boot_counter = Some(self.counters.read(false));
            // The first transmission carries 1
            message.retransmission_counter =
                Some(retransmission_counter.wrapping_add(1));
            message.hmac = Some(vec![0; self.config.tag_len]);
        } else {
            message.hmac = None;
        }

        if self.config.encryption {
            // Adding the padding byte back must leave a valid block size
            if let Some(block2) = message.block2.as_mut() {
                if block2.size >= MAX_BLOCK_SIZE {
                    warn!(
                        "Block2 size {} leaves no room for padding",
                        block2.size
                    );
                    return Err(coap::Error::InvalidBlock.into());
                }
                block2.size += 1;
            }
            if !message.payload.is_empty() {
                let key = self.key(identity)?;
                message.payload =
                    crypto::encrypt_payload(key.as_bytes(), &message.payload);
                message.client_identity = Some(identity);
                message.encryption = Some(EncryptionAlgorithm::Aes128Padded);
            }
        }

        Ok(())
    }

    fn key(&self, identity: u8) -> Result<&PresharedKey> {
        self.keys.lookup(identity).ok_or_else(|| {
            warn!("No pre-shared key for client identity {}", identity);
            Error::UnknownIdentity(identity)
        })
    }

    fn max_wire_payload(&self) -> usize {
        if self.config.encryption {
            self.config.max_chunk_size + BLOCK_LEN
        } else {
            self.config.max_chunk_size
        }
    }

    fn verify(
        &self,
        message: &Message,
        datagram: &[u8],
        tag: Option<Range<usize>>,
    ) -> bool {
        if !self.config.integrity {
            return true;
        }

        let tag = match tag {
            Some(tag) if tag.len() == self.config.tag_len => tag,
            Some(tag) => {
                warn!(
                    "Tag has {} B, expected {} B",
                    tag.len(),
                    self.config.tag_len
                );
                return false;
            }
            None => {
                warn!("Message {} carries no tag", message.message_id);
                return false;
            }
        };
        let key = match message.client_identity.map(|i| self.key(i)) {
            Some(Ok(key)) => key,
            _ => return false,
        };

        let valid = crypto::verify_tag(key.as_bytes(), datagram, tag);
        if !valid {
            warn!("HMAC of message {} is invalid", message.message_id);
        }
        valid
    }

    fn was_encrypted(&self, message: &Message) -> bool {
        match message.encryption {
            Some(EncryptionAlgorithm::Aes128Padded) => true,
            _ => {
                self.config.empty_payload_is_encrypted
                    && message.payload.is_empty()
            }
        }
    }

    /// Replaces the payload by its plaintext, returning whether that
    /// succeeded.
    fn decrypt(&self, message: &mut Message) -> bool {
        let plaintext = message
            .client_identity
            .ok_or(Error::UnknownIdentity(0))
            .and_then(|identity| self.key(identity))
            .and_then(|key| {
                crypto::decrypt_payload(key.as_bytes(), &message.payload)
            });

        match plaintext {
            Ok(plaintext) => {
                message.payload = plaintext;
                message.encryption = None;
                true
            }
            Err(e) => {
                warn!(
                    "Decryption of message {} failed: {}",
                    message.message_id, e
                );
                false
            }
        }
    }

    fn inspect(&self, message: &Message) -> bool {
        if !self.config.inspection {
            return true;
        }

        let still_encrypted = match message.encryption {
            None | Some(EncryptionAlgorithm::None) => false,
            Some(_) => !message.payload.is_empty(),
        };
        if still_encrypted {
            warn!(
                "Payload of message {} is encrypted, can't inspect",
                message.message_id
            );
            return false;
        }

        let clean = self.inspector.is_clean(&message.payload);
        if !clean {
            warn!("Payload of message {} flagged", message.message_id);
        }
        clean
    }
}
