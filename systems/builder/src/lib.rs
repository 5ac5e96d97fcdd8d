#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure session controller that turns player input into world commands.
//!
//! The builder follows the world's event stream to learn the current phase
//! and pending card placement, and remembers which tower the player is
//! inspecting. It never reads the world directly; lookups are supplied as
//! closures mirroring the world's query helpers.

use road_defence_core::{CellCoord, Command, Event, Phase, Placement, TowerId};

/// Declarative preview of the pending placement at a hovered cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacementPreview {
    /// Cell that would receive the placement.
    pub cell: CellCoord,
    /// Placement granted by the chosen card.
    pub placement: Placement,
    /// Indicates whether the world would accept the placement.
    pub placeable: bool,
}

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuilderInput {
    /// Indicates whether the player clicked on this frame.
    pub confirm_action: bool,
    /// Cell currently hovered by the cursor.
    pub cursor_cell: Option<CellCoord>,
    /// Offered card the player picked on this frame.
    pub choose_card: Option<usize>,
    /// Indicates whether the player asked to upgrade the inspected tower.
    pub purchase_action: bool,
    /// Indicates whether the player asked to start the next wave.
    pub start_wave_action: bool,
}

/// Per-session controller that translates input into commands.
#[derive(Clone, Debug)]
pub struct Builder {
    phase: Phase,
    pending: Option<Placement>,
    inspected: Option<TowerId>,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    /// Creates a controller for a session that opens with a card offer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: Phase::Card,
            pending: None,
            inspected: None,
        }
    }

    /// Phase last announced by the world.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Placement waiting for a target cell.
    #[must_use]
    pub const fn pending(&self) -> Option<Placement> {
        self.pending
    }

    /// Tower whose upgrade panel is open.
    #[must_use]
    pub const fn inspected(&self) -> Option<TowerId> {
        self.inspected
    }

    /// Previews the pending placement at `cell`.
    ///
    /// `can_place` should mirror the world's `query::can_place` helper.
    pub fn preview<P>(&self, cell: CellCoord, mut can_place: P) -> Option<PlacementPreview>
    where
        P: FnMut(CellCoord, Placement) -> bool,
    {
        if self.phase != Phase::Build {
            return None;
        }
        let placement = self.pending?;
        Some(PlacementPreview {
            cell,
            placement,
            placeable: can_place(cell, placement),
        })
    }

    /// Consumes world events and adapter-derived input to emit commands.
    ///
    /// Clicking a tower inspects it; clicking any other cell while a card is
    /// pending places the card there when the preview is placeable.
    pub fn handle<T, P>(
        &mut self,
        events: &[Event],
        input: BuilderInput,
        mut tower_at: T,
        can_place: P,
        out: &mut Vec<Command>,
    ) where
        T: FnMut(CellCoord) -> Option<TowerId>,
        P: FnMut(CellCoord, Placement) -> bool,
    {
        for event in events {
            self.observe(event);
        }

        if self.phase == Phase::End {
            return;
        }

        if let Some(index) = input.choose_card {
            if self.phase == Phase::Card {
                out.push(Command::ChooseCard { index });
            }
        }

        if input.confirm_action {
            if let Some(cell) = input.cursor_cell {
                if let Some(tower) = tower_at(cell) {
                    self.inspected = Some(tower);
                } else {
                    self.inspected = None;
                    if let Some(preview) = self.preview(cell, can_place) {
                        if preview.placeable {
                            out.push(Command::Place {
                                cell,
                                placement: preview.placement,
                            });
                        }
                    }
                }
            }
        }

        if input.purchase_action {
            if let Some(tower) = self.inspected {
                out.push(Command::PurchaseUpgrade { tower });
            }
        }

        if input.start_wave_action && self.phase != Phase::Wave {
            out.push(Command::StartWave);
        }
    }

    fn observe(&mut self, event: &Event) {
        match event {
            Event::PhaseChanged { phase } => {
                self.phase = *phase;
                if *phase != Phase::Build {
                    self.pending = None;
                }
                if *phase == Phase::End {
                    self.inspected = None;
                }
            }
            Event::CardChosen { placement, .. } => self.pending = Some(*placement),
            Event::RoadPlaced { .. } | Event::TowerPlaced { .. } | Event::TerrainPlaced { .. } => {
                self.pending = None;
            }
            _ => {}
        }
    }
}
