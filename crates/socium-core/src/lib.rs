//! Core simulation engine for the Socium faction world.
//!
//! A fixed population of agents moves on a toroidal plane. Each agent
//! references an immutable personality record that carries its faction and
//! behavioral traits; interactions between factions drain resources and
//! replace personality references, so the population composition drifts
//! while the agent count stays constant.

use std::collections::VecDeque;

use ordered_float::OrderedFloat;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use socium_space::{LinearScan, ProximityScan, SpaceError, TorusPlane};
use thiserror::Error;

/// Population created at construction unless overridden in configuration.
pub const DEFAULT_AGENT_COUNT: usize = 500;
/// Radius within which an agent perceives neighbors.
pub const VISION_RADIUS: f32 = 60.0;
/// Collision radius shared by every agent.
pub const AGENT_RADIUS: f32 = 4.0;
/// Energy lost by every active agent each tick.
pub const ENERGY_DECAY: f32 = 0.000_05;
/// Cruising speed is the personality's energy trait times this factor.
pub const SPEED_FACTOR: f32 = 2.0;
/// Fleeing agents move faster than pursuing ones.
pub const FLEE_SPEED_FACTOR: f32 = 1.5;
/// Fraction of the velocity delta blended in per tick while steering.
pub const STEERING_GAIN: f32 = 0.1;
/// Resource transferred per contact when an Entropics drain lands.
pub const DRAIN_AMOUNT: f32 = 0.01;
/// Energy granted to the initiator of a successful drain.
pub const DRAIN_ENERGY_REWARD: f32 = 0.1;
/// Upper bound applied to energy on gain.
pub const ENERGY_CAP: f32 = 1.0;
/// Energy assigned to every agent at spawn.
pub const INITIAL_ENERGY: f32 = 1.0;
/// Resource assigned to every agent at spawn.
pub const INITIAL_RESOURCE: f32 = 0.5;
/// Resource an agent keeps after collapsing into the Inert fallback.
pub const DEPLETED_RESOURCE_RESET: f32 = 0.5;
/// Resource a drained victim keeps after an Entropics takeover.
pub const CAPTURED_RESOURCE_RESET: f32 = 0.2;
/// Resource an Inert agent keeps after a Luminary conversion.
pub const UPLIFTED_RESOURCE_RESET: f32 = 0.5;
/// Fraction of the population relocated by a glitch.
pub const GLITCH_FRACTION: f32 = 0.2;

/// Behavioral archetype governing predation and conversion rules.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Faction {
    Entropics,
    Luminaries,
    Inert,
}

/// Behavioral intent one faction holds toward a neighbor of another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// The neighbor is worth pursuing.
    Target,
    /// The neighbor is worth running from.
    Threat,
    /// The neighbor does not affect behavior.
    Ignore,
}

/// The faction rule table.
///
/// Entropics hunt everyone outside their own faction. Luminaries run from
/// Entropics and otherwise seek out Inert agents (to convert) and each
/// other. Inert agents only ever run from Entropics.
#[must_use]
pub const fn intent(own: Faction, other: Faction) -> Intent {
    match (own, other) {
        (Faction::Entropics, Faction::Luminaries | Faction::Inert) => Intent::Target,
        (Faction::Luminaries, Faction::Entropics) => Intent::Threat,
        (Faction::Luminaries, Faction::Inert | Faction::Luminaries) => Intent::Target,
        (Faction::Inert, Faction::Entropics) => Intent::Threat,
        _ => Intent::Ignore,
    }
}

/// Behavioral state recomputed from the neighbor classification each tick.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum BehaviorState {
    #[default]
    Idle,
    Hunt,
    Flee,
}

/// Stable agent identifier, assigned at creation and never reused.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
pub struct AgentId(pub u32);

/// Handle into the personality catalog.
///
/// Agents store this instead of a personality copy, so a conversion is a
/// single handle reassignment and every agent referencing a record observes
/// the same immutable data.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
pub struct PersonalityRef(usize);

/// Immutable personality record shared by any number of agents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Personality {
    pub id: String,
    pub name: String,
    pub color: String,
    pub faction: Faction,
    pub aggression: f32,
    pub empathy: f32,
    pub energy: f32,
}

/// Arena of personality records, loaded once and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalityCatalog {
    entries: Vec<Personality>,
    inert_fallback: Option<PersonalityRef>,
}

impl PersonalityCatalog {
    /// Build a catalog from flattened records.
    ///
    /// The first Inert record becomes the fallback target for
    /// energy-depletion conversion. An empty catalog is rejected: agents
    /// cannot exist without a type.
    pub fn new(entries: Vec<Personality>) -> Result<Self, SimulationError> {
        if entries.is_empty() {
            return Err(SimulationError::EmptyCatalog);
        }
        let inert_fallback = entries
            .iter()
            .position(|personality| personality.faction == Faction::Inert)
            .map(PersonalityRef);
        Ok(Self {
            entries,
            inert_fallback,
        })
    }

    /// Number of records in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the catalog has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a handle to its record.
    #[must_use]
    pub fn get(&self, reference: PersonalityRef) -> &Personality {
        &self.entries[reference.0]
    }

    /// Look up a handle by personality identifier.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<PersonalityRef> {
        self.entries
            .iter()
            .position(|personality| personality.id == id)
            .map(PersonalityRef)
    }

    /// Handle of the first Inert record, if the catalog carries one.
    #[must_use]
    pub const fn inert_fallback(&self) -> Option<PersonalityRef> {
        self.inert_fallback
    }

    /// Iterate over the records in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Personality> {
        self.entries.iter()
    }
}

/// Axis-aligned 2D position in world units.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    /// Construct a new position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// View as a coordinate pair for plane math.
    #[must_use]
    pub const fn as_pair(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

/// Velocity vector in world units per tick.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Velocity {
    pub vx: f32,
    pub vy: f32,
}

impl Velocity {
    /// Construct a new velocity vector.
    #[must_use]
    pub const fn new(vx: f32, vy: f32) -> Self {
        Self { vx, vy }
    }
}

/// One simulated entity.
///
/// Agents are created once at construction (or reset) and never removed;
/// "destruction" is expressed as conversion to the Inert personality.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Agent {
    pub id: AgentId,
    pub personality: PersonalityRef,
    pub position: Position,
    pub velocity: Velocity,
    pub energy: f32,
    pub resource: f32,
    pub state: BehaviorState,
    pub radius: f32,
    /// Reserved for forward compatibility; no current operation sets it.
    pub is_deactivated: bool,
}

/// Flat per-agent record handed across the engine boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentSnapshot {
    pub id: u32,
    pub personality_id: String,
    pub x: f32,
    pub y: f32,
    pub faction: Faction,
    pub energy: f32,
    pub resource: f32,
    pub name: String,
    pub color: String,
    pub state: BehaviorState,
    pub is_deactivated: bool,
}

/// Simulation clock (ticks processed since construction or reset).
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct Tick(pub u64);

impl Tick {
    /// Returns the next sequential tick.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Resets the tick counter back to zero.
    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }
}

/// Aggregate counts sampled after a tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TickSummary {
    pub tick: Tick,
    pub agent_count: usize,
    pub idle: usize,
    pub hunting: usize,
    pub fleeing: usize,
    pub entropics: usize,
    pub luminaries: usize,
    pub inert: usize,
    pub average_energy: f32,
}

/// Errors that can occur when constructing or resetting a simulation.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Indicates an invalid configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    /// The personality catalog carried no records.
    #[error("personality catalog must not be empty")]
    EmptyCatalog,
    /// The world extents could not describe a plane.
    #[error(transparent)]
    Space(#[from] SpaceError),
}

/// Static configuration for a simulation instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationConfig {
    /// Width of the plane in world units.
    pub width: f32,
    /// Height of the plane in world units.
    pub height: f32,
    /// Number of agents created at construction; constant thereafter.
    pub agent_count: usize,
    /// Optional RNG seed for reproducible runs.
    pub rng_seed: Option<u64>,
    /// Maximum number of tick summaries retained in memory.
    pub history_capacity: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            agent_count: DEFAULT_AGENT_COUNT,
            rng_seed: None,
            history_capacity: 256,
        }
    }
}

impl SimulationConfig {
    /// Validate the configuration, returning the plane it describes.
    fn validate(&self) -> Result<TorusPlane, SimulationError> {
        let plane = TorusPlane::new(self.width, self.height)?;
        if self.agent_count == 0 {
            return Err(SimulationError::InvalidConfig(
                "agent_count must be non-zero",
            ));
        }
        if self.history_capacity == 0 {
            return Err(SimulationError::InvalidConfig(
                "history_capacity must be non-zero",
            ));
        }
        Ok(plane)
    }

    /// Returns the configured RNG, seeding from entropy if no seed is set.
    fn seeded_rng(&self) -> SmallRng {
        match self.rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => {
                let seed: u64 = rand::random();
                SmallRng::seed_from_u64(seed)
            }
        }
    }
}

/// The simulation engine: owns the plane, the agent population, and the
/// personality catalog, and drives the per-tick pipeline.
///
/// All operations are synchronous and must not interleave; callers exposing
/// the engine behind a concurrent boundary serialize access through one
/// exclusive lock per instance.
pub struct Simulation {
    config: SimulationConfig,
    plane: TorusPlane,
    catalog: PersonalityCatalog,
    agents: Vec<Agent>,
    scan: LinearScan,
    rng: SmallRng,
    tick: Tick,
    order: Vec<usize>,
    neighbor_scratch: Vec<(usize, f32)>,
    pair_scratch: Vec<(f32, f32)>,
    history: VecDeque<TickSummary>,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("config", &self.config)
            .field("tick", &self.tick)
            .field("agent_count", &self.agents.len())
            .field("catalog_len", &self.catalog.len())
            .finish()
    }
}

impl Simulation {
    /// Instantiate a new simulation from configuration and catalog.
    pub fn new(
        config: SimulationConfig,
        catalog: PersonalityCatalog,
    ) -> Result<Self, SimulationError> {
        let plane = config.validate()?;
        let mut rng = config.seeded_rng();
        let agents = Self::populate(&plane, &catalog, &mut rng, config.agent_count);
        let history_capacity = config.history_capacity;
        Ok(Self {
            config,
            plane,
            catalog,
            agents,
            scan: LinearScan,
            rng,
            tick: Tick::zero(),
            order: Vec::new(),
            neighbor_scratch: Vec::new(),
            pair_scratch: Vec::new(),
            history: VecDeque::with_capacity(history_capacity),
        })
    }

    /// Discard all simulation state and rebuild from scratch.
    ///
    /// The engine instance survives; nothing else does. A validation
    /// failure leaves the current state untouched.
    pub fn reset(
        &mut self,
        config: SimulationConfig,
        catalog: PersonalityCatalog,
    ) -> Result<(), SimulationError> {
        *self = Self::new(config, catalog)?;
        Ok(())
    }

    fn populate(
        plane: &TorusPlane,
        catalog: &PersonalityCatalog,
        rng: &mut SmallRng,
        count: usize,
    ) -> Vec<Agent> {
        (0..count)
            .map(|index| {
                let personality = PersonalityRef(rng.random_range(0..catalog.len()));
                let position = Position::new(
                    rng.random_range(0.0..plane.width()),
                    rng.random_range(0.0..plane.height()),
                );
                let speed = catalog.get(personality).energy * SPEED_FACTOR;
                let heading = rng.random_range(0.0..std::f32::consts::TAU);
                Agent {
                    id: AgentId(index as u32),
                    personality,
                    position,
                    velocity: Velocity::new(heading.cos() * speed, heading.sin() * speed),
                    energy: INITIAL_ENERGY,
                    resource: INITIAL_RESOURCE,
                    state: BehaviorState::Idle,
                    radius: AGENT_RADIUS,
                    is_deactivated: false,
                }
            })
            .collect()
    }

    /// Execute one simulation tick.
    ///
    /// Agents are processed in a freshly shuffled order with in-place
    /// mutation, so an agent touched earlier in the tick is observed by
    /// later agents with its updated state. That order sensitivity is part
    /// of the model; the RNG seed is the one knob that pins it down.
    pub fn step(&mut self) -> TickSummary {
        let mut order = std::mem::take(&mut self.order);
        order.clear();
        order.extend(0..self.agents.len());
        order.shuffle(&mut self.rng);
        for &index in &order {
            self.step_agent(index);
        }
        self.order = order;

        self.tick = self.tick.next();
        let summary = self.summary();
        if self.history.len() >= self.config.history_capacity {
            self.history.pop_front();
        }
        self.history.push_back(summary.clone());
        summary
    }

    fn step_agent(&mut self, index: usize) {
        if self.agents[index].energy <= 0.0 {
            self.convert_to_inert(index);
            return;
        }
        self.agents[index].energy -= ENERGY_DECAY;

        let mut neighbors = std::mem::take(&mut self.neighbor_scratch);
        self.gather_neighbors(index, &mut neighbors);

        let own_ref = self.agents[index].personality;
        let (own_faction, speed) = {
            let personality = self.catalog.get(own_ref);
            (personality.faction, personality.energy * SPEED_FACTOR)
        };

        let mut nearest_target: Option<(usize, OrderedFloat<f32>)> = None;
        let mut nearest_threat: Option<(usize, OrderedFloat<f32>)> = None;
        for &(other, dist) in &neighbors {
            let other_faction = self.catalog.get(self.agents[other].personality).faction;
            let dist = OrderedFloat(dist);
            match intent(own_faction, other_faction) {
                Intent::Target => {
                    if nearest_target.map_or(true, |(_, best)| dist < best) {
                        nearest_target = Some((other, dist));
                    }
                }
                Intent::Threat => {
                    if nearest_threat.map_or(true, |(_, best)| dist < best) {
                        nearest_threat = Some((other, dist));
                    }
                }
                Intent::Ignore => {}
            }
        }

        // Threats outrank targets.
        if let Some((threat, _)) = nearest_threat {
            self.agents[index].state = BehaviorState::Flee;
            let (dx, dy) = self.plane.delta(
                self.agents[index].position.as_pair(),
                self.agents[threat].position.as_pair(),
            );
            self.steer(index, (-dx, -dy), speed * FLEE_SPEED_FACTOR);
        } else if let Some((target, _)) = nearest_target {
            self.agents[index].state = BehaviorState::Hunt;
            let (dx, dy) = self.plane.delta(
                self.agents[index].position.as_pair(),
                self.agents[target].position.as_pair(),
            );
            self.steer(index, (dx, dy), speed);
        } else {
            self.agents[index].state = BehaviorState::Idle;
        }

        // Contact resolution runs over the same neighbor set regardless of
        // the behavioral outcome above.
        for &(other, dist) in &neighbors {
            if dist < self.agents[index].radius + self.agents[other].radius {
                self.resolve_contact(index, other);
            }
        }

        neighbors.clear();
        self.neighbor_scratch = neighbors;

        let agent = &self.agents[index];
        let next = self.plane.wrap((
            agent.position.x + agent.velocity.vx,
            agent.position.y + agent.velocity.vy,
        ));
        self.agents[index].position = Position::new(next.0, next.1);
    }

    fn gather_neighbors(&mut self, origin: usize, out: &mut Vec<(usize, f32)>) {
        out.clear();
        self.pair_scratch.clear();
        self.pair_scratch
            .extend(self.agents.iter().map(|agent| agent.position.as_pair()));
        self.scan.for_each_within(
            &self.plane,
            &self.pair_scratch,
            origin,
            VISION_RADIUS,
            &mut |other, dist| out.push((other, dist.into_inner())),
        );
    }

    fn steer(&mut self, index: usize, direction: (f32, f32), speed: f32) {
        let magnitude = (direction.0 * direction.0 + direction.1 * direction.1).sqrt();
        if magnitude <= 0.0 {
            return;
        }
        let target_vx = direction.0 / magnitude * speed;
        let target_vy = direction.1 / magnitude * speed;
        let velocity = &mut self.agents[index].velocity;
        velocity.vx += (target_vx - velocity.vx) * STEERING_GAIN;
        velocity.vy += (target_vy - velocity.vy) * STEERING_GAIN;
    }

    /// Directional contact effect: only the initiator's faction decides.
    fn resolve_contact(&mut self, actor: usize, other: usize) {
        let actor_ref = self.agents[actor].personality;
        let (actor_faction, aggression) = {
            let personality = self.catalog.get(actor_ref);
            (personality.faction, personality.aggression)
        };
        match actor_faction {
            Faction::Entropics => {
                let empathy = self.catalog.get(self.agents[other].personality).empathy;
                if aggression > empathy {
                    self.agents[other].resource -= DRAIN_AMOUNT;
                    let attacker = &mut self.agents[actor];
                    attacker.resource += DRAIN_AMOUNT;
                    attacker.energy = (attacker.energy + DRAIN_ENERGY_REWARD).min(ENERGY_CAP);
                    if self.agents[other].resource <= 0.0 {
                        let victim = &mut self.agents[other];
                        victim.personality = actor_ref;
                        victim.resource = CAPTURED_RESOURCE_RESET;
                    }
                }
            }
            Faction::Luminaries => {
                if self.catalog.get(self.agents[other].personality).faction == Faction::Inert {
                    let converted = &mut self.agents[other];
                    converted.personality = actor_ref;
                    converted.resource = UPLIFTED_RESOURCE_RESET;
                }
            }
            Faction::Inert => {}
        }
    }

    fn convert_to_inert(&mut self, index: usize) {
        if let Some(fallback) = self.catalog.inert_fallback() {
            let agent = &mut self.agents[index];
            agent.personality = fallback;
            agent.resource = DEPLETED_RESOURCE_RESET;
        }
    }

    /// Teleport a random fifth of the population to random positions.
    ///
    /// Velocity, energy, resource, personality, and state are untouched.
    /// A population too small to yield a whole agent is left alone.
    pub fn glitch(&mut self) {
        let count = (self.agents.len() as f32 * GLITCH_FRACTION) as usize;
        if count == 0 {
            return;
        }
        let picks = rand::seq::index::sample(&mut self.rng, self.agents.len(), count);
        for index in picks {
            let position = Position::new(
                self.rng.random_range(0.0..self.plane.width()),
                self.rng.random_range(0.0..self.plane.height()),
            );
            self.agents[index].position = position;
        }
    }

    /// Freeze all momentum: zero every velocity and force every state to
    /// IDLE. Positions, energy, resource, and personalities are untouched.
    pub fn observer_collapse(&mut self) {
        for agent in &mut self.agents {
            agent.velocity = Velocity::default();
            agent.state = BehaviorState::Idle;
        }
    }

    /// Flat per-agent records reflecting state after the most recent
    /// tick or trigger.
    #[must_use]
    pub fn snapshot(&self) -> Vec<AgentSnapshot> {
        self.agents
            .iter()
            .map(|agent| {
                let personality = self.catalog.get(agent.personality);
                AgentSnapshot {
                    id: agent.id.0,
                    personality_id: personality.id.clone(),
                    x: agent.position.x,
                    y: agent.position.y,
                    faction: personality.faction,
                    energy: agent.energy,
                    resource: agent.resource,
                    name: personality.name.clone(),
                    color: personality.color.clone(),
                    state: agent.state,
                    is_deactivated: agent.is_deactivated,
                }
            })
            .collect()
    }

    /// Aggregate counts over the current population.
    #[must_use]
    pub fn summary(&self) -> TickSummary {
        let mut summary = TickSummary {
            tick: self.tick,
            agent_count: self.agents.len(),
            ..TickSummary::default()
        };
        let mut total_energy = 0.0;
        for agent in &self.agents {
            total_energy += agent.energy;
            match self.catalog.get(agent.personality).faction {
                Faction::Entropics => summary.entropics += 1,
                Faction::Luminaries => summary.luminaries += 1,
                Faction::Inert => summary.inert += 1,
            }
            match agent.state {
                BehaviorState::Idle => summary.idle += 1,
                BehaviorState::Hunt => summary.hunting += 1,
                BehaviorState::Flee => summary.fleeing += 1,
            }
        }
        if !self.agents.is_empty() {
            summary.average_energy = total_energy / self.agents.len() as f32;
        }
        summary
    }

    /// Iterate over retained tick summaries, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &TickSummary> {
        self.history.iter()
    }

    /// Current simulation tick.
    #[must_use]
    pub const fn tick(&self) -> Tick {
        self.tick
    }

    /// Number of agents; constant for the lifetime of a run.
    #[must_use]
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Read-only view of the population.
    #[must_use]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Mutable view of the population.
    ///
    /// Exposed as a slice so the agent count cannot change from outside.
    #[must_use]
    pub fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.agents
    }

    /// Returns an immutable reference to configuration.
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The personality catalog backing this run.
    #[must_use]
    pub const fn catalog(&self) -> &PersonalityCatalog {
        &self.catalog
    }

    /// The toroidal plane agents move on.
    #[must_use]
    pub const fn plane(&self) -> &TorusPlane {
        &self.plane
    }
}
