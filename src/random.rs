use crate::constants::{
    ESPEON_CROSSOVER_KEEP_SECONDARY_PROB, ESPEON_CROSSOVER_PICK_LEQ_PROB,
    ESPEON_CROSSOVER_PICK_MATCHED_PROB, ESPEON_SMALL_WEIGHT_PROB,
};
use core::cmp::min;
use rand::RngCore;
use std::{
    fs::File,
    io::{self, Read},
    time::{SystemTime, UNIX_EPOCH},
};

/// Coin-flips made while reproducing, each with its own configurable probability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvolutionEvent {
    /// a new connection's weight is drawn from the narrow range
    SmallWeight,
    /// the left parent's copy of a matching gene is inherited
    PickMatched,
    /// the left parent counts as fitter when fitness is tied
    PickLEQ,
    /// the less-fit parent's disjoint and excess genes are inherited
    KeepSecondary,
}

pub const fn percent(x: u64) -> u64 {
    x * (u64::MAX / 100)
}

pub trait Probabilities {
    type Update;
    fn probability(&self, evt: EvolutionEvent) -> u64;
    fn update(&mut self, stats: Self::Update);
}

pub trait Happens: RngCore + Probabilities {
    fn happens(&mut self, evt: EvolutionEvent) -> bool;
}

impl<T: RngCore + Probabilities> Happens for T {
    fn happens(&mut self, evt: EvolutionEvent) -> bool {
        self.probability(evt) > self.next_u64()
    }
}

#[derive(Debug, Clone)]
pub struct ProbStatic {
    small_weight: u64,
    pick_matched: u64,
    pick_leq: u64,
    keep_secondary: u64,
}

impl ProbStatic {
    pub fn with_overrides(mut self, updates: &[(EvolutionEvent, u64)]) -> Self {
        for update in updates {
            self.update(*update);
        }
        self
    }
}

impl Default for ProbStatic {
    fn default() -> Self {
        Self {
            small_weight: ESPEON_SMALL_WEIGHT_PROB,
            pick_matched: ESPEON_CROSSOVER_PICK_MATCHED_PROB,
            pick_leq: ESPEON_CROSSOVER_PICK_LEQ_PROB,
            keep_secondary: ESPEON_CROSSOVER_KEEP_SECONDARY_PROB,
        }
    }
}

impl Probabilities for ProbStatic {
    type Update = (EvolutionEvent, u64);
    fn probability(&self, evt: EvolutionEvent) -> u64 {
        match evt {
            EvolutionEvent::SmallWeight => self.small_weight,
            EvolutionEvent::PickMatched => self.pick_matched,
            EvolutionEvent::PickLEQ => self.pick_leq,
            EvolutionEvent::KeepSecondary => self.keep_secondary,
        }
    }

    fn update(&mut self, (evt, v): Self::Update) {
        match evt {
            EvolutionEvent::SmallWeight => self.small_weight = v,
            EvolutionEvent::PickMatched => self.pick_matched = v,
            EvolutionEvent::PickLEQ => self.pick_leq = v,
            EvolutionEvent::KeepSecondary => self.keep_secondary = v,
        }
    }
}

pub struct WyRng {
    state: u64,
}

impl WyRng {
    pub fn seeded(state: u64) -> Self {
        Self { state }
    }
}

impl RngCore for WyRng {
    fn next_u32(&mut self) -> u32 {
        self.next_u64() as u32
    }

    fn next_u64(&mut self) -> u64 {
        const WY_CONST_0: u64 = 0x2d35_8dcc_aa6c_78a5;
        const WY_CONST_1: u64 = 0x8bb8_4b93_962e_acc9;
        self.state = self.state.wrapping_add(WY_CONST_0);
        let t = u128::from(self.state) * u128::from(self.state ^ WY_CONST_1);
        (t as u64) ^ (t >> 64) as u64
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        let mut idx = 0;
        while idx < dst.len() {
            let lim = min(8, dst.len() - idx);
            dst[idx..idx + lim].copy_from_slice(&self.next_u64().to_ne_bytes()[..lim]);
            idx += lim;
        }
    }
}

pub struct ProbBinding<P: Probabilities, R: RngCore> {
    p: P,
    r: R,
}

impl<P: Probabilities, R: RngCore> ProbBinding<P, R> {
    pub fn new(p: P, r: R) -> Self {
        Self { p, r }
    }
}

impl ProbBinding<ProbStatic, WyRng> {
    #[allow(clippy::should_implement_trait)]
    pub fn default() -> Self {
        Self::new(ProbStatic::default(), default_rng())
    }
}

impl<P: Probabilities, R: RngCore> Probabilities for ProbBinding<P, R> {
    type Update = P::Update;
    fn probability(&self, evt: EvolutionEvent) -> u64 {
        self.p.probability(evt)
    }

    fn update(&mut self, stats: Self::Update) {
        self.p.update(stats);
    }
}

impl<P: Probabilities, R: RngCore> RngCore for ProbBinding<P, R> {
    fn next_u32(&mut self) -> u32 {
        self.r.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.r.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.r.fill_bytes(dest)
    }
}

pub fn seed_urandom() -> io::Result<u64> {
    let mut file = File::open("/dev/urandom")?;
    let mut buffer = [0u8; 8];
    file.read_exact(&mut buffer)?;
    Ok(u64::from_le_bytes(buffer))
}

/// A [WyRng] seeded from /dev/urandom, or from the clock where that isn't readable
pub fn default_rng() -> WyRng {
    WyRng::seeded(seed_urandom().unwrap_or_else(|_| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos() as u64)
    }))
}
