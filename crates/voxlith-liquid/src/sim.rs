use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use voxlith_chunk::{ChunkShell, ShellSample, VoxelChunk, WaterCell};
use voxlith_voxel::{LiquidKind, VoxelCatalog, VoxelTypeId};

use crate::config::LiquidConfig;
use crate::error::LiquidError;

/// Something that happened during a tick, in world voxel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LiquidEvent {
    Transfer {
        from: [i32; 3],
        to: [i32; 3],
        kind: LiquidKind,
        amount: u8,
    },
    PhaseChange {
        at: [i32; 3],
        into: VoxelTypeId,
    },
}

/// Liquid leaving a chunk, applied to the target chunk after the source's
/// tick. Whatever the target cannot take goes back to the source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub from: [i32; 3],
    pub to: [i32; 3],
    pub kind: LiquidKind,
    pub amount: u8,
    pub falling: bool,
}

#[derive(Debug, Default)]
pub struct TickOutput {
    pub events: Vec<LiquidEvent>,
    pub outbox: Vec<Transfer>,
    pub changed: bool,
    pub phase_changed: bool,
}

/// Result of offering liquid to a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// `accepted` units were added; the rest was refused.
    Accepted { accepted: u8 },
    /// Opposing liquids met and the cell turned solid; the offer was consumed.
    PhaseChange,
}

/// Cellular automaton over liquid cells.
///
/// Owned by the single liquid-simulation thread, so the RNG needs no locking.
pub struct LiquidSim {
    config: LiquidConfig,
    rng: SmallRng,
    phase_solid: VoxelTypeId,
}

const HORIZONTAL: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

impl LiquidSim {
    pub fn new(config: LiquidConfig, catalog: &VoxelCatalog) -> Result<Self, LiquidError> {
        let name = &config.phase_change_voxel;
        let phase_solid = catalog
            .id_by_name(name)
            .ok_or_else(|| LiquidError::UnknownPhaseVoxel(name.clone()))?;
        if !catalog.is_solid(phase_solid) {
            return Err(LiquidError::PhaseVoxelNotSolid(name.clone()));
        }
        let rates = [
            ("water_spread_rate", config.water_spread_rate),
            ("lava_spread_min", config.lava_spread_min),
            ("lava_spread_max", config.lava_spread_max),
        ];
        for (name, value) in rates {
            if !(0.0..=1.0).contains(&value) {
                return Err(LiquidError::SpreadRate { name, value });
            }
        }
        if config.lava_spread_min > config.lava_spread_max {
            return Err(LiquidError::LavaSpreadRange {
                min: config.lava_spread_min,
                max: config.lava_spread_max,
            });
        }
        let rng = SmallRng::seed_from_u64(config.rng_seed);
        Ok(Self {
            config,
            rng,
            phase_solid,
        })
    }

    pub fn config(&self) -> &LiquidConfig {
        &self.config
    }

    pub fn phase_solid(&self) -> VoxelTypeId {
        self.phase_solid
    }

    fn spread_rate(&mut self, kind: LiquidKind) -> f32 {
        match kind {
            LiquidKind::Water => self.config.water_spread_rate,
            LiquidKind::Lava => {
                let (lo, hi) = (self.config.lava_spread_min, self.config.lava_spread_max);
                if hi > lo { self.rng.gen_range(lo..hi) } else { lo }
            }
            LiquidKind::None => 0.0,
        }
    }

    /// Runs one tick over a single chunk.
    ///
    /// Cells are visited in a shuffled order. Targets outside the chunk come
    /// from `shell`; an unloaded target blocks flow, a loaded one receives the
    /// liquid through the returned outbox. Cells that received liquid this
    /// tick do not act as sources until the next tick.
    pub fn step_chunk(
        &mut self,
        chunk: &mut VoxelChunk,
        shell: &ChunkShell,
        catalog: &VoxelCatalog,
    ) -> TickOutput {
        let mut out = TickOutput::default();
        chunk.reset_liquid_tick();
        let d = chunk.dims();
        let mut order: Vec<usize> = (0..d.volume())
            .filter(|&i| !chunk.cells.water[i].is_empty())
            .collect();
        order.shuffle(&mut self.rng);

        for i in order {
            let w = chunk.cells.water[i];
            if w.is_empty() || w.changed_this_tick {
                continue;
            }
            let [x, y, z] = d.pos(i);
            let (x, y, z) = (x as i32, y as i32, z as i32);
            if catalog.is_solid(chunk.cells.types[i]) {
                chunk.cells.water[i].clear();
                out.changed = true;
                continue;
            }
            let mut remaining = w.level;
            let kind = w.kind;

            let threshold = self.config.evaporation_threshold;
            if threshold > 0 && remaining < threshold && self.rng.r#gen::<f32>() < self.config.evaporation_chance {
                remaining -= 1;
                out.changed = true;
                if remaining == 0 {
                    chunk.cells.water[i].clear();
                    continue;
                }
            }

            let fell = self.offer(chunk, shell, catalog, [x, y, z], [x, y - 1, z], kind, remaining, true, &mut out);
            remaining -= fell;

            if remaining > 0 {
                let mut dirs = HORIZONTAL;
                dirs.shuffle(&mut self.rng);
                for (dx, dz) in dirs {
                    if remaining == 0 {
                        break;
                    }
                    let target = [x + dx, y, z + dz];
                    let Some(nb_level) = self.open_level(chunk, shell, catalog, target, kind) else {
                        continue;
                    };
                    if nb_level >= remaining {
                        continue;
                    }
                    let room = 255 - nb_level;
                    let rate = self.spread_rate(kind);
                    let amount = ((f32::from(remaining.min(room)) * rate) as u8).min(remaining);
                    if amount == 0 {
                        continue;
                    }
                    let moved = self.offer(chunk, shell, catalog, [x, y, z], target, kind, amount, false, &mut out);
                    remaining -= moved;
                }
            }

            let cell = &mut chunk.cells.water[i];
            if remaining != w.level {
                out.changed = true;
            }
            if remaining == 0 {
                cell.clear();
            } else {
                cell.level = remaining;
                cell.kind = kind;
                cell.is_falling = fell > 0;
            }
        }
        if out.changed || out.phase_changed {
            chunk.flags().mark_liquid_dirty();
        }
        out
    }

    /// Level a neighbor holds for `kind`, or `None` if it cannot take liquid.
    /// Opposing liquids report 0 so contact can trigger a phase change.
    fn open_level(
        &self,
        chunk: &VoxelChunk,
        shell: &ChunkShell,
        catalog: &VoxelCatalog,
        at: [i32; 3],
        kind: LiquidKind,
    ) -> Option<u8> {
        let s = if chunk.in_bounds(at[0], at[1], at[2]) {
            let c = chunk.get(at[0], at[1], at[2])?;
            ShellSample::Voxel {
                type_id: c.type_id,
                ramp: c.ramp,
                sun: c.sun,
                water: c.water,
            }
        } else {
            shell.get(at[0], at[1], at[2])
        };
        match s {
            ShellSample::Missing => None,
            ShellSample::Voxel { type_id, water, .. } => {
                if catalog.is_solid(type_id) {
                    None
                } else if water.is_empty() || water.kind == kind {
                    Some(water.level)
                } else {
                    Some(0)
                }
            }
        }
    }

    /// Moves up to `amount` from `from` into `to`. In-chunk targets are
    /// written immediately; out-of-chunk targets are queued in the outbox and
    /// count as moved. Returns the amount taken from the source.
    #[allow(clippy::too_many_arguments)]
    fn offer(
        &mut self,
        chunk: &mut VoxelChunk,
        shell: &ChunkShell,
        catalog: &VoxelCatalog,
        from: [i32; 3],
        to: [i32; 3],
        kind: LiquidKind,
        amount: u8,
        falling: bool,
        out: &mut TickOutput,
    ) -> u8 {
        if amount == 0 {
            return 0;
        }
        let [tx, ty, tz] = to;
        let wf = chunk.local_to_world(from[0], from[1], from[2]);
        let wt = chunk.local_to_world(tx, ty, tz);
        if !chunk.in_bounds(tx, ty, tz) {
            let Some(level) = self.open_level(chunk, shell, catalog, to, kind) else {
                return 0;
            };
            let moved = amount.min(255 - level);
            if moved > 0 {
                out.outbox.push(Transfer {
                    from: wf,
                    to: wt,
                    kind,
                    amount: moved,
                    falling,
                });
            }
            return moved;
        }
        match self.deliver(chunk, [tx, ty, tz], kind, amount, falling, catalog) {
            Delivery::Accepted { accepted } => {
                if accepted > 0 {
                    out.events.push(LiquidEvent::Transfer {
                        from: wf,
                        to: wt,
                        kind,
                        amount: accepted,
                    });
                }
                accepted
            }
            Delivery::PhaseChange => {
                out.events.push(LiquidEvent::Transfer {
                    from: wf,
                    to: wt,
                    kind,
                    amount,
                });
                out.events.push(LiquidEvent::PhaseChange {
                    at: wt,
                    into: self.phase_solid,
                });
                out.phase_changed = true;
                amount
            }
        }
    }

    /// Offers `amount` of `kind` to local cell `at`. Solid cells refuse
    /// everything; an opposing liquid turns the cell solid.
    pub fn deliver(
        &mut self,
        chunk: &mut VoxelChunk,
        at: [i32; 3],
        kind: LiquidKind,
        amount: u8,
        falling: bool,
        catalog: &VoxelCatalog,
    ) -> Delivery {
        let [x, y, z] = at;
        let Some(cell) = chunk.get(x, y, z) else {
            return Delivery::Accepted { accepted: 0 };
        };
        if catalog.is_solid(cell.type_id) || kind.is_none() {
            return Delivery::Accepted { accepted: 0 };
        }
        let w = cell.water;
        if !w.is_empty() && w.kind != kind {
            // set_type clears the liquid and flags lighting and mesh work.
            if chunk.set_type(x, y, z, self.phase_solid, catalog).is_ok() {
                chunk.flags().mark_liquid_dirty();
                log::debug!(target: "liquid", "phase change at {:?}", chunk.local_to_world(x, y, z));
                return Delivery::PhaseChange;
            }
            return Delivery::Accepted { accepted: 0 };
        }
        let accepted = amount.min(255 - w.level);
        if accepted > 0 {
            let i = chunk.dims().idx(x as usize, y as usize, z as usize);
            chunk.cells.water[i] = WaterCell {
                level: w.level + accepted,
                kind,
                changed_this_tick: true,
                is_falling: falling,
            };
            chunk.flags().mark_liquid_dirty();
        }
        Delivery::Accepted { accepted }
    }

    /// Applies an outbox transfer to its target chunk. Returns the refused amount.
    pub fn receive(
        &mut self,
        target: &mut VoxelChunk,
        transfer: &Transfer,
        catalog: &VoxelCatalog,
        events: &mut Vec<LiquidEvent>,
    ) -> u8 {
        let [wx, wy, wz] = transfer.to;
        let Some([x, y, z]) = target.world_to_local(wx, wy, wz) else {
            return transfer.amount;
        };
        let at = [x as i32, y as i32, z as i32];
        match self.deliver(target, at, transfer.kind, transfer.amount, transfer.falling, catalog) {
            Delivery::Accepted { accepted } => {
                if accepted > 0 {
                    events.push(LiquidEvent::Transfer {
                        from: transfer.from,
                        to: transfer.to,
                        kind: transfer.kind,
                        amount: accepted,
                    });
                }
                transfer.amount - accepted
            }
            Delivery::PhaseChange => {
                events.push(LiquidEvent::Transfer {
                    from: transfer.from,
                    to: transfer.to,
                    kind: transfer.kind,
                    amount: transfer.amount,
                });
                events.push(LiquidEvent::PhaseChange {
                    at: transfer.to,
                    into: self.phase_solid,
                });
                0
            }
        }
    }

    /// Puts refused liquid back into the source cell. Returns the amount
    /// that could not be restored: the cell filled up meanwhile or now holds
    /// the other liquid.
    pub fn refund(&self, source: &mut VoxelChunk, transfer: &Transfer, amount: u8) -> u8 {
        if amount == 0 {
            return 0;
        }
        let [wx, wy, wz] = transfer.from;
        let Some([x, y, z]) = source.world_to_local(wx, wy, wz) else {
            log::debug!(target: "liquid", "refund of {amount} to {:?} lost: source not in chunk", transfer.from);
            return amount;
        };
        let i = source.dims().idx(x, y, z);
        let w = &mut source.cells.water[i];
        if w.is_empty() {
            w.kind = transfer.kind;
        } else if w.kind != transfer.kind {
            log::debug!(
                target: "liquid",
                "refund of {amount} {:?} to {:?} lost: cell now holds {:?}",
                transfer.kind, transfer.from, w.kind
            );
            return amount;
        }
        let restored = amount.min(255 - w.level);
        w.level += restored;
        let lost = amount - restored;
        if lost > 0 {
            log::debug!(target: "liquid", "refund to {:?} clipped, {lost} lost", transfer.from);
        }
        if restored > 0 {
            source.flags().mark_liquid_dirty();
        }
        lost
    }
}

impl std::fmt::Debug for LiquidSim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiquidSim")
            .field("config", &self.config)
            .field("phase_solid", &self.phase_solid)
            .finish_non_exhaustive()
    }
}
