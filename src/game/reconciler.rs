//! Sensor reconciliation state machine
//!
//! Turns occupancy edges into pick, place, capture, cancel and promotion
//! events. Sensors cannot tell pieces apart, so identity comes from the
//! [`BoardState`]: a falling edge on a square the board says is occupied is
//! a pickup, and the lifted piece is whatever the board had there.
//!
//! # States
//!
//! ```text
//!  Idle ──lift──▶ Lifted ──place on empty legal square──▶ Idle / AwaitingPromotion
//!                   │  ▲ ──place back on origin──────────▶ Idle
//!                   │  └─ place elsewhere: InvalidPlacement, stays Lifted
//!                   └──lift opposing piece on legal square──▶ AwaitingCaptureRemoval
//!  AwaitingCaptureRemoval ──place on target──▶ Idle / AwaitingPromotion
//!                         ──place on origin──▶ Idle
//!  AwaitingPromotion ──lift pawn──▶ (cleared) ──place promoted piece──▶ Idle
//! ```
//!
//! Every transition is a pure function of (state, board, edge, gate), see
//! [`transition`]. Only one piece can be "in hand" at a time.

use crate::game::error::GameError;
use crate::game::rules::{generate_moves, is_promotion_move, promoted_piece, BoardState, MoveList};
use crate::game::sensors::{EdgeKind, SensorEdge};
use crate::game::types::{Color, Piece, Square};
use smallvec::smallvec;
use tracing::{debug, info, warn};

/// Progress of the physical pawn-for-queen swap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromotionStage {
    /// The pawn still stands on the promotion square
    PawnOnSquare,
    /// The pawn was lifted, waiting for the promoted piece
    SquareCleared,
}

/// The single live selection
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Idle,
    /// A piece is in hand; its destinations were frozen at lift time
    Lifted {
        origin: Square,
        piece: Piece,
        legal_destinations: MoveList,
    },
    /// The captured piece on `target` was lifted off; waiting for `piece`
    /// to be set down there
    AwaitingCaptureRemoval {
        origin: Square,
        target: Square,
        piece: Piece,
    },
    /// A pawn reached its promotion row and must be swapped by hand
    AwaitingPromotion {
        square: Square,
        color: Color,
        stage: PromotionStage,
    },
}

impl SelectionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, SelectionState::Idle)
    }
}

/// Which pickups are currently allowed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupGate {
    /// Any piece may be lifted
    Any,
    /// Only pieces of this color may be lifted
    Side(Color),
    /// Only the piece on `from` may be lifted, and only `to` accepts it
    Instruction { from: Square, to: Square },
    /// No pickup is allowed
    Locked,
}

/// Confirmed outcome of a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcilerEvent {
    Pick {
        origin: Square,
        piece: Piece,
        destinations: MoveList,
    },
    /// The opposing piece on `target` was removed as the first half of a capture
    CaptureLift {
        origin: Square,
        target: Square,
        captured: Piece,
    },
    Place {
        from: Square,
        to: Square,
        piece: Piece,
        captured: Option<Piece>,
        promotes: bool,
    },
    Cancel {
        origin: Square,
    },
    PromotionPieceRemoved {
        square: Square,
    },
    Promotion {
        square: Square,
        piece: Piece,
    },
}

/// Next state plus what the transition produced
///
/// On `Err` the next state always equals the state the edge was applied to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: SelectionState,
    pub outcome: Result<ReconcilerEvent, GameError>,
}

impl Transition {
    fn to(next: SelectionState, event: ReconcilerEvent) -> Self {
        Transition {
            next,
            outcome: Ok(event),
        }
    }

    fn rejected(state: &SelectionState, error: GameError) -> Self {
        Transition {
            next: state.clone(),
            outcome: Err(error),
        }
    }
}

/// Apply one sensor edge to a selection state
///
/// Returns `None` when the edge does not qualify in this state (noise, or a
/// gesture the state machine does not track); the state is then unchanged.
pub fn transition(
    state: &SelectionState,
    board: &BoardState,
    edge: SensorEdge,
    gate: PickupGate,
) -> Option<Transition> {
    match state {
        SelectionState::Idle => from_idle(state, board, edge, gate),

        SelectionState::Lifted {
            origin,
            piece,
            legal_destinations,
        } => {
            let (origin, piece) = (*origin, *piece);
            let square = edge.square;
            match edge.kind {
                EdgeKind::Rising if square == origin => Some(Transition::to(
                    SelectionState::Idle,
                    ReconcilerEvent::Cancel { origin },
                )),
                EdgeKind::Rising if legal_destinations.contains(&square) => {
                    // A rising edge on an occupied legal square cannot happen
                    // without its falling edge first.
                    if !board.is_empty(square) {
                        return None;
                    }
                    Some(place(origin, square, piece, None))
                }
                EdgeKind::Rising => Some(Transition::rejected(
                    state,
                    GameError::InvalidPlacement { square },
                )),
                EdgeKind::Falling if legal_destinations.contains(&square) => {
                    let captured = board.piece_at(square)?;
                    if captured.color == piece.color {
                        return None;
                    }
                    Some(Transition::to(
                        SelectionState::AwaitingCaptureRemoval {
                            origin,
                            target: square,
                            piece,
                        },
                        ReconcilerEvent::CaptureLift {
                            origin,
                            target: square,
                            captured,
                        },
                    ))
                }
                EdgeKind::Falling => None,
            }
        }

        SelectionState::AwaitingCaptureRemoval {
            origin,
            target,
            piece,
        } => {
            if !edge.is_rising() {
                return None;
            }
            if edge.square == *target {
                Some(place(*origin, *target, *piece, board.piece_at(*target)))
            } else if edge.square == *origin {
                Some(Transition::to(
                    SelectionState::Idle,
                    ReconcilerEvent::Cancel { origin: *origin },
                ))
            } else {
                Some(Transition::rejected(
                    state,
                    GameError::InvalidPlacement {
                        square: edge.square,
                    },
                ))
            }
        }

        SelectionState::AwaitingPromotion {
            square,
            color,
            stage,
        } => {
            if edge.square != *square {
                return None;
            }
            match (stage, edge.kind) {
                (PromotionStage::PawnOnSquare, EdgeKind::Falling) => Some(Transition::to(
                    SelectionState::AwaitingPromotion {
                        square: *square,
                        color: *color,
                        stage: PromotionStage::SquareCleared,
                    },
                    ReconcilerEvent::PromotionPieceRemoved { square: *square },
                )),
                (PromotionStage::SquareCleared, EdgeKind::Rising) => Some(Transition::to(
                    SelectionState::Idle,
                    ReconcilerEvent::Promotion {
                        square: *square,
                        piece: promoted_piece(*color),
                    },
                )),
                _ => None,
            }
        }
    }
}

fn from_idle(
    state: &SelectionState,
    board: &BoardState,
    edge: SensorEdge,
    gate: PickupGate,
) -> Option<Transition> {
    if !edge.is_falling() {
        return None;
    }
    let origin = edge.square;
    let piece = board.piece_at(origin)?;

    let destinations: MoveList = match gate {
        PickupGate::Any => generate_moves(board, origin),
        PickupGate::Side(color) if piece.color == color => generate_moves(board, origin),
        PickupGate::Instruction { from, to } if from == origin => smallvec![to],
        PickupGate::Side(_) | PickupGate::Instruction { .. } | PickupGate::Locked => {
            return Some(Transition::rejected(
                state,
                GameError::IllegalPickup { square: origin },
            ));
        }
    };

    Some(Transition::to(
        SelectionState::Lifted {
            origin,
            piece,
            legal_destinations: destinations.clone(),
        },
        ReconcilerEvent::Pick {
            origin,
            piece,
            destinations,
        },
    ))
}

fn place(from: Square, to: Square, piece: Piece, captured: Option<Piece>) -> Transition {
    let promotes = is_promotion_move(piece, to.row());
    let next = if promotes {
        SelectionState::AwaitingPromotion {
            square: to,
            color: piece.color,
            stage: PromotionStage::PawnOnSquare,
        }
    } else {
        SelectionState::Idle
    };
    Transition::to(
        next,
        ReconcilerEvent::Place {
            from,
            to,
            piece,
            captured,
            promotes,
        },
    )
}

/// Owns the live [`SelectionState`] and feeds it one tick of edges at a time
#[derive(Debug, Default)]
pub struct SensorReconciler {
    state: SelectionState,
}

impl SensorReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    /// Discard any selection in progress
    pub fn reset(&mut self) {
        self.state = SelectionState::Idle;
    }

    /// Run one tick: the first qualifying edge (row-major) wins
    ///
    /// Returns `None` if no edge qualified. Later edges of the same tick are
    /// dropped; the caller's next snapshot becomes the new baseline.
    pub fn reconcile(
        &mut self,
        board: &BoardState,
        edges: &[SensorEdge],
        gate: PickupGate,
    ) -> Option<Result<ReconcilerEvent, GameError>> {
        for &edge in edges {
            let Some(step) = transition(&self.state, board, edge, gate) else {
                debug!("[RECONCILER] Ignoring edge {} in {:?}", edge, self.state);
                continue;
            };

            match &step.outcome {
                Ok(event) => info!("[RECONCILER] {} -> {:?}", edge, event),
                Err(error) => warn!("[RECONCILER] {} rejected: {}", edge, error),
            }
            if edges.len() > 1 {
                debug!(
                    "[RECONCILER] {} simultaneous edges this tick, acted on {}",
                    edges.len(),
                    edge
                );
            }

            self.state = step.next;
            return Some(step.outcome);
        }
        None
    }
}
