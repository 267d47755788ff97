#![no_std]

//! # Mock VRF Coordinator
//!
//! Stands in for the randomness oracle in tests. Consumers call
//! `request_random` and receive an id; the test then delivers the words with
//! `fulfill` (derived from a server seed) or `fulfill_with_words` (exact
//! values), which calls back `fulfill_random` on the consumer.

use soroban_sdk::{
    contract, contractclient, contracterror, contractevent, contractimpl, contracttype, Address,
    Bytes, BytesN, Env, Vec,
};

#[contractevent]
pub struct EvRandomWordsRequested {
    #[topic]
    pub request_id: u64,
    pub consumer: Address,
    pub num_words: u32,
}

#[contractevent]
pub struct EvRandomWordsFulfilled {
    #[topic]
    pub request_id: u64,
    pub consumer: Address,
}

/// Callback every consumer exposes.
#[contractclient(name = "RandomConsumerClient")]
pub trait RandomConsumer {
    fn fulfill_random(env: Env, coordinator: Address, request_id: u64, words: Vec<u64>);
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum MockVrfError {
    RequestNotFound = 1,
    InvalidWordCount = 2,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PendingRequest {
    pub consumer: Address,
    pub key_hash: BytesN<32>,
    pub subscription_id: u64,
    pub num_words: u32,
}

#[contracttype]
#[derive(Clone)]
enum DataKey {
    RequestCount,
    Pending(u64),
}

#[contract]
pub struct MockVrfCoordinator;

#[contractimpl]
impl MockVrfCoordinator {
    /// Queue a request. Ids start at 1.
    pub fn request_random(
        env: Env,
        consumer: Address,
        key_hash: BytesN<32>,
        subscription_id: u64,
        num_words: u32,
    ) -> Result<u64, MockVrfError> {
        consumer.require_auth();
        if num_words == 0 {
            return Err(MockVrfError::InvalidWordCount);
        }
        let request_id = Self::request_count(env.clone()) + 1;
        env.storage()
            .instance()
            .set(&DataKey::RequestCount, &request_id);
        env.storage().persistent().set(
            &DataKey::Pending(request_id),
            &PendingRequest {
                consumer: consumer.clone(),
                key_hash,
                subscription_id,
                num_words,
            },
        );

        EvRandomWordsRequested {
            request_id,
            consumer,
            num_words,
        }
        .publish(&env);
        Ok(request_id)
    }

    /// Deliver words derived from `server_seed`:
    /// `word[i] = be_u64(sha256(seed || request_id || i)[0..8])`.
    pub fn fulfill(env: Env, request_id: u64, server_seed: BytesN<32>) -> Result<(), MockVrfError> {
        let request = Self::pending(env.clone(), request_id)?;
        let mut words = Vec::new(&env);
        for i in 0..request.num_words {
            words.push_back(derive_word(&env, &server_seed, request_id, i));
        }
        Self::deliver(&env, request_id, &request, &words);
        Ok(())
    }

    /// Deliver exactly `words`; their count must match the request.
    pub fn fulfill_with_words(env: Env, request_id: u64, words: Vec<u64>) -> Result<(), MockVrfError> {
        let request = Self::pending(env.clone(), request_id)?;
        if words.len() != request.num_words {
            return Err(MockVrfError::InvalidWordCount);
        }
        Self::deliver(&env, request_id, &request, &words);
        Ok(())
    }

    pub fn pending(env: Env, request_id: u64) -> Result<PendingRequest, MockVrfError> {
        env.storage()
            .persistent()
            .get(&DataKey::Pending(request_id))
            .ok_or(MockVrfError::RequestNotFound)
    }

    pub fn request_count(env: Env) -> u64 {
        env.storage()
            .instance()
            .get(&DataKey::RequestCount)
            .unwrap_or(0)
    }

    fn deliver(env: &Env, request_id: u64, request: &PendingRequest, words: &Vec<u64>) {
        env.storage()
            .persistent()
            .remove(&DataKey::Pending(request_id));
        RandomConsumerClient::new(env, &request.consumer).fulfill_random(
            &env.current_contract_address(),
            &request_id,
            words,
        );
        EvRandomWordsFulfilled {
            request_id,
            consumer: request.consumer.clone(),
        }
        .publish(env);
    }
}

fn derive_word(env: &Env, server_seed: &BytesN<32>, request_id: u64, index: u32) -> u64 {
    let mut preimage = [0u8; 44];
    preimage[..32].copy_from_slice(&server_seed.to_array());
    preimage[32..40].copy_from_slice(&request_id.to_be_bytes());
    preimage[40..].copy_from_slice(&index.to_be_bytes());

    let digest: BytesN<32> = env.crypto().sha256(&Bytes::from_slice(env, &preimage)).into();
    let arr = digest.to_array();
    u64::from_be_bytes([arr[0], arr[1], arr[2], arr[3], arr[4], arr[5], arr[6], arr[7]])
}

#[cfg(test)]
mod test {
    use super::*;
    use soroban_sdk::vec;

    #[contracttype]
    #[derive(Clone)]
    enum ConsumerKey {
        Last,
    }

    #[contracttype]
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub struct Delivery {
        pub request_id: u64,
        pub words: Vec<u64>,
    }

    /// Records the last delivery.
    #[contract]
    pub struct RecordingConsumer;

    #[contractimpl]
    impl RecordingConsumer {
        pub fn fulfill_random(env: Env, coordinator: Address, request_id: u64, words: Vec<u64>) {
            coordinator.require_auth();
            env.storage()
                .instance()
                .set(&ConsumerKey::Last, &Delivery { request_id, words });
        }

        pub fn last(env: Env) -> Option<Delivery> {
            env.storage().instance().get(&ConsumerKey::Last)
        }
    }

    fn setup() -> (Env, MockVrfCoordinatorClient<'static>, RecordingConsumerClient<'static>) {
        let env = Env::default();
        env.mock_all_auths();
        let coordinator = MockVrfCoordinatorClient::new(&env, &env.register(MockVrfCoordinator, ()));
        let consumer = RecordingConsumerClient::new(&env, &env.register(RecordingConsumer, ()));
        (env, coordinator, consumer)
    }

    fn key(env: &Env) -> BytesN<32> {
        BytesN::from_array(env, &[7u8; 32])
    }

    #[test]
    fn ids_are_sequential() {
        let (env, coordinator, consumer) = setup();
        assert_eq!(coordinator.request_random(&consumer.address, &key(&env), &1, &2), 1);
        assert_eq!(coordinator.request_random(&consumer.address, &key(&env), &1, &1), 2);
        assert_eq!(coordinator.request_count(), 2);
        assert_eq!(coordinator.pending(&2).num_words, 1);
    }

    #[test]
    fn fulfill_with_words_calls_back() {
        let (env, coordinator, consumer) = setup();
        let id = coordinator.request_random(&consumer.address, &key(&env), &9, &2);
        coordinator.fulfill_with_words(&id, &vec![&env, 11u64, 22u64]);

        assert_eq!(
            consumer.last(),
            Some(Delivery {
                request_id: id,
                words: vec![&env, 11u64, 22u64],
            })
        );
        assert_eq!(
            coordinator.try_pending(&id),
            Err(Ok(MockVrfError::RequestNotFound))
        );
    }

    #[test]
    fn seeded_words_are_deterministic() {
        let (env, coordinator, consumer) = setup();
        let seed = BytesN::from_array(&env, &[42u8; 32]);
        let id = coordinator.request_random(&consumer.address, &key(&env), &9, &3);
        coordinator.fulfill(&id, &seed);

        let Delivery { request_id, words } = consumer.last().unwrap();
        assert_eq!(request_id, id);
        assert_eq!(words.len(), 3);
        assert_eq!(words.get(0).unwrap(), derive_word(&env, &seed, id, 0));
        assert_ne!(words.get(0), words.get(1));
    }

    #[test]
    fn wrong_word_count_is_rejected() {
        let (env, coordinator, consumer) = setup();
        let id = coordinator.request_random(&consumer.address, &key(&env), &9, &2);
        assert_eq!(
            coordinator.try_fulfill_with_words(&id, &vec![&env, 1u64]),
            Err(Ok(MockVrfError::InvalidWordCount))
        );
        assert_eq!(
            coordinator.try_request_random(&consumer.address, &key(&env), &9, &0),
            Err(Ok(MockVrfError::InvalidWordCount))
        );
    }

    #[test]
    fn unknown_request_is_rejected() {
        let (env, coordinator, _) = setup();
        let seed = BytesN::from_array(&env, &[1u8; 32]);
        assert_eq!(
            coordinator.try_fulfill(&5, &seed),
            Err(Ok(MockVrfError::RequestNotFound))
        );
    }
}
