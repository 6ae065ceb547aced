//! Fruit that ripens, rots and gets eaten.
//!
//! Fruit is scheduled ahead of time: a freshly spawned fruit gets a creation
//! time a few seconds in the future and only becomes visible (and edible)
//! once game time reaches it.

use std::collections::HashSet;
use std::time::Duration;

use log::debug;
use rand::Rng;

use crate::grid::{Bounds, Coords};

#[derive(Clone, Debug, PartialEq)]
pub struct MarketSettings {
    /// Mean spawns per second of the exponential inter-arrival draw.
    pub spawn_rate: f64,
    pub min_gap: Duration,
    pub max_gap: Duration,
    /// `None` keeps fruit around forever.
    pub lifetime: Option<Duration>,
    pub points: u32,
}

impl Default for MarketSettings {
    fn default() -> Self {
        MarketSettings {
            spawn_rate: 0.1,
            min_gap: Duration::from_secs(5),
            max_gap: Duration::from_secs(30),
            lifetime: Some(Duration::from_secs(30)),
            points: 10,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fruit {
    pub pos: Coords,
    pub created: Duration,
    pub expires: Option<Duration>,
    pub points: u32,
}

impl Fruit {
    pub fn new(pos: Coords, created: Duration, expires: Option<Duration>, points: u32) -> Self {
        Fruit { pos, created, expires, points }
    }

    pub fn is_ripe(&self, now: Duration) -> bool {
        self.created <= now
    }

    pub fn is_expired(&self, now: Duration) -> bool {
        matches!(self.expires, Some(expires) if now > expires)
    }
}

#[derive(Clone, Debug)]
pub struct FruitMarket {
    fruits: Vec<Fruit>,
    settings: MarketSettings,
}

impl FruitMarket {
    pub fn new(settings: MarketSettings) -> Self {
        FruitMarket { fruits: vec![], settings }
    }

    pub fn fruits(&self) -> &[Fruit] {
        &self.fruits
    }

    /// Fruit that has already appeared at game time `now`.
    pub fn ripe(&self, now: Duration) -> impl Iterator<Item = &Fruit> + '_ {
        self.fruits.iter().filter(move |fruit| fruit.is_ripe(now))
    }

    pub fn is_fruit_at(&self, pos: Coords) -> bool {
        self.fruits.iter().any(|fruit| fruit.pos == pos)
    }

    /// Creation time of the most recently scheduled fruit.
    pub fn youngest(&self) -> Option<Duration> {
        self.fruits.iter().map(|fruit| fruit.created).max()
    }

    /// A new fruit is due once every scheduled fruit has appeared.
    pub fn is_spawn_due(&self, now: Duration) -> bool {
        match self.youngest() {
            None => true,
            Some(youngest) => youngest <= now,
        }
    }

    /// Adds a fruit unless another one already sits on its cell.
    pub fn insert(&mut self, fruit: Fruit) -> bool {
        if self.is_fruit_at(fruit.pos) {
            return false;
        }
        self.fruits.push(fruit);
        true
    }

    /// Schedules a new fruit on a random free cell of `bounds`. Returns
    /// `None` when every cell is taken by the snake or other fruit.
    pub fn spawn<R: Rng + ?Sized>(
        &mut self,
        now: Duration,
        occupied: &HashSet<Coords>,
        bounds: Bounds,
        rng: &mut R,
    ) -> Option<&Fruit> {
        let free = bounds
            .cells()
            .filter(|pos| !occupied.contains(pos) && !self.is_fruit_at(*pos))
            .count();
        if free == 0 {
            debug!("No free cell left for fruit at {:?}", now);
            return None;
        }

        let pos = loop {
            let candidate = bounds.random_cell(rng);
            if !occupied.contains(&candidate) && !self.is_fruit_at(candidate) {
                break candidate;
            }
        };

        let created = self.next_arrival(now, rng);
        let expires = self.settings.lifetime.map(|lifetime| created + lifetime);
        debug!("Fruit scheduled at {} for {:?}, expiring {:?}", pos, created, expires);

        self.fruits.push(Fruit::new(pos, created, expires, self.settings.points));
        self.fruits.last()
    }

    /// Drops rotten fruit and eats whatever ripe fruit lies at `head`.
    /// Returns the points earned. Fruit that is both rotten and eaten this
    /// turn still counts as eaten.
    pub fn prune_and_consume(&mut self, now: Duration, head: Coords) -> u32 {
        let mut gained = 0;
        self.fruits.retain(|fruit| {
            if fruit.is_ripe(now) && fruit.pos == head {
                debug!("Fruit at {} eaten for {} points", fruit.pos, fruit.points);
                gained += fruit.points;
                false
            } else if fruit.is_expired(now) {
                debug!("Fruit at {} rotted", fruit.pos);
                false
            } else {
                true
            }
        });
        gained
    }

    /// Creation time for the next fruit: an exponential gap truncated to
    /// `[min_gap, max_gap)`, after both `now` and the youngest fruit.
    fn next_arrival<R: Rng + ?Sized>(&self, now: Duration, rng: &mut R) -> Duration {
        let base = self.youngest().map_or(now, |youngest| youngest.max(now));
        let (min, max) = (self.settings.min_gap.as_secs_f64(), self.settings.max_gap.as_secs_f64());
        let gap = truncated_exponential(self.settings.spawn_rate, min, max, rng);
        base + Duration::from_secs_f64(gap)
    }
}

/// One inverse-CDF draw from Exp(`rate`) conditioned on `[min, max)`.
fn truncated_exponential<R: Rng + ?Sized>(rate: f64, min: f64, max: f64, rng: &mut R) -> f64 {
    let u: f64 = rng.gen();
    // Probability mass of the window, measured from `min`.
    let mass = -(-rate * (max - min)).exp_m1();
    let gap = min - (-u * mass).ln_1p() / rate;
    if gap.is_finite() && gap >= min && gap < max && gap > 0.0 {
        gap
    } else {
        min
    }
}
