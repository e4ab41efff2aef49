//! codec, prime selection, split and reconstruct behind one handle

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::config::{Config, Params};
use crate::prime::select_prime;
use crate::reconstruct::reconstruct_value;
use crate::share::ShareRecord;
use crate::split::split_value;
use crate::{codec, Result};

/// sharing engine bound to a validated configuration.
///
/// holds no random state; every split draws from the generator it is
/// handed, or from the os for [`Engine::split`].
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: Config,
}

impl Engine {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// validate quorum and share count against this engine's limits
    pub fn params(&self, quorum: usize, share_count: usize) -> Result<Params> {
        Params::new(quorum, share_count, &self.config).map_err(|err| {
            warn!(quorum, share_count, max = self.config.max_shares, "split parameters rejected");
            err
        })
    }

    /// split secret bytes into `params.share_count` shares
    pub fn split_with_rng<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        secret: &[u8],
        params: Params,
    ) -> Result<Vec<ShareRecord>> {
        let params = self.params(params.quorum, params.share_count)?;
        let value = codec::encode(secret, self.config.max_secret_len)?;
        let prime = select_prime(value.expose(), &self.config, rng)?;
        debug!(
            secret_len = secret.len(),
            quorum = params.quorum,
            share_count = params.share_count,
            "splitting secret"
        );
        split_value(rng, value.expose(), params.share_count, params.quorum, &prime)
    }

    /// split with a fresh os-backed generator
    pub fn split(&self, secret: &[u8], params: Params) -> Result<Vec<ShareRecord>> {
        self.split_with_rng(&mut OsRng, secret, params)
    }

    /// recover secret bytes from a quorum of shares
    pub fn reconstruct(&self, records: &[ShareRecord]) -> Result<Zeroizing<Vec<u8>>> {
        let value = reconstruct_value(records)?;
        codec::decode(value.expose())
    }
}
