//! Phase names in the usual seismological nomenclature, reduced to an ordered
//! plan of down-going, up-going and diffracted legs.

use crate::domain::{EllipError, WaveType};
use std::fmt::{Display, Formatter};

/// Fixed depths a leg can start or stop at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Station {
    Source,
    Surface,
    Cmb,
    Icb,
}

/// Region inside which a ray turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRegion {
    Mantle,
    OuterCore,
    InnerCore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegSpan {
    Fixed(Station),
    Turn(TurnRegion),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannedLeg {
    Down {
        wave: WaveType,
        from: Station,
        to: LegSpan,
    },
    Up {
        wave: WaveType,
        from: LegSpan,
        to: Station,
    },
    /// Grazes the core-mantle boundary.
    Diffracted { wave: WaveType },
}

impl PlannedLeg {
    pub fn wave(&self) -> WaveType {
        match self {
            Self::Down { wave, .. } | Self::Up { wave, .. } | Self::Diffracted { wave } => *wave,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhaseError {
    #[error("phase name is empty")]
    Empty,
    #[error("phase '{phase}': unsupported symbol '{symbol}' at position {position}")]
    UnknownSymbol {
        phase: String,
        symbol: String,
        position: usize,
    },
    #[error("phase '{phase}': '{symbol}' cannot follow the preceding legs")]
    UnexpectedSymbol { phase: String, symbol: String },
    #[error("phase '{phase}' does not end at the surface")]
    Unterminated { phase: String },
}

impl From<PhaseError> for EllipError {
    fn from(error: PhaseError) -> Self {
        EllipError::input_validation("INPUT.PHASE", error.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    DepthLeg(WaveType),
    Mantle(WaveType),
    MantleDiff(WaveType),
    CmbReflection,
    OuterCore,
    IcbReflection,
    InnerCore(WaveType),
}

impl Token {
    fn symbol(self) -> &'static str {
        match self {
            Self::DepthLeg(WaveType::P) => "p",
            Self::DepthLeg(WaveType::S) => "s",
            Self::Mantle(WaveType::P) => "P",
            Self::Mantle(WaveType::S) => "S",
            Self::MantleDiff(WaveType::P) => "Pdiff",
            Self::MantleDiff(WaveType::S) => "Sdiff",
            Self::CmbReflection => "c",
            Self::OuterCore => "K",
            Self::IcbReflection => "i",
            Self::InnerCore(WaveType::P) => "I",
            Self::InnerCore(WaveType::S) => "J",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Start,
    Surface,
    EnteredOuterCore,
    EnteredInnerCore,
    LeftInnerCore,
    BelowMantle,
}

/// Parsed phase name with its leg plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhasePlan {
    name: String,
    legs: Vec<PlannedLeg>,
}

impl PhasePlan {
    pub fn parse(name: &str) -> Result<Self, PhaseError> {
        let name = name.trim();
        let tokens = tokenize(name)?;
        let unexpected = |token: Token| PhaseError::UnexpectedSymbol {
            phase: name.to_string(),
            symbol: token.symbol().to_string(),
        };

        let mut legs = Vec::new();
        let mut position = Position::Start;
        let mut index = 0;

        if let Some(Token::DepthLeg(wave)) = tokens.first() {
            legs.push(PlannedLeg::Up {
                wave: *wave,
                from: LegSpan::Fixed(Station::Source),
                to: Station::Surface,
            });
            position = Position::Surface;
            index = 1;
        }

        while index < tokens.len() {
            let token = tokens[index];
            let next = tokens.get(index + 1).copied();
            let origin = if position == Position::Start {
                Station::Source
            } else {
                Station::Surface
            };

            match position {
                Position::Start | Position::Surface => match (token, next) {
                    (Token::MantleDiff(wave), _) => {
                        legs.push(PlannedLeg::Down {
                            wave,
                            from: origin,
                            to: LegSpan::Fixed(Station::Cmb),
                        });
                        legs.push(PlannedLeg::Diffracted { wave });
                        legs.push(PlannedLeg::Up {
                            wave,
                            from: LegSpan::Fixed(Station::Cmb),
                            to: Station::Surface,
                        });
                        position = Position::Surface;
                        index += 1;
                    }
                    (Token::Mantle(wave), Some(Token::CmbReflection)) => {
                        let Some(Token::Mantle(reflected)) = tokens.get(index + 2).copied() else {
                            return Err(unexpected(Token::CmbReflection));
                        };
                        legs.push(PlannedLeg::Down {
                            wave,
                            from: origin,
                            to: LegSpan::Fixed(Station::Cmb),
                        });
                        legs.push(PlannedLeg::Up {
                            wave: reflected,
                            from: LegSpan::Fixed(Station::Cmb),
                            to: Station::Surface,
                        });
                        position = Position::Surface;
                        index += 3;
                    }
                    (Token::Mantle(wave), Some(Token::OuterCore)) => {
                        legs.push(PlannedLeg::Down {
                            wave,
                            from: origin,
                            to: LegSpan::Fixed(Station::Cmb),
                        });
                        position = Position::EnteredOuterCore;
                        index += 1;
                    }
                    (Token::Mantle(wave), _) => {
                        legs.push(PlannedLeg::Down {
                            wave,
                            from: origin,
                            to: LegSpan::Turn(TurnRegion::Mantle),
                        });
                        legs.push(PlannedLeg::Up {
                            wave,
                            from: LegSpan::Turn(TurnRegion::Mantle),
                            to: Station::Surface,
                        });
                        position = Position::Surface;
                        index += 1;
                    }
                    _ => return Err(unexpected(token)),
                },
                Position::EnteredOuterCore => {
                    if token != Token::OuterCore {
                        return Err(unexpected(token));
                    }
                    match next {
                        Some(Token::IcbReflection) => {
                            if tokens.get(index + 2) != Some(&Token::OuterCore) {
                                return Err(unexpected(Token::IcbReflection));
                            }
                            legs.push(PlannedLeg::Down {
                                wave: WaveType::P,
                                from: Station::Cmb,
                                to: LegSpan::Fixed(Station::Icb),
                            });
                            legs.push(PlannedLeg::Up {
                                wave: WaveType::P,
                                from: LegSpan::Fixed(Station::Icb),
                                to: Station::Cmb,
                            });
                            position = Position::BelowMantle;
                            index += 3;
                        }
                        Some(Token::InnerCore(_)) => {
                            legs.push(PlannedLeg::Down {
                                wave: WaveType::P,
                                from: Station::Cmb,
                                to: LegSpan::Fixed(Station::Icb),
                            });
                            position = Position::EnteredInnerCore;
                            index += 1;
                        }
                        _ => {
                            legs.push(PlannedLeg::Down {
                                wave: WaveType::P,
                                from: Station::Cmb,
                                to: LegSpan::Turn(TurnRegion::OuterCore),
                            });
                            legs.push(PlannedLeg::Up {
                                wave: WaveType::P,
                                from: LegSpan::Turn(TurnRegion::OuterCore),
                                to: Station::Cmb,
                            });
                            position = Position::BelowMantle;
                            index += 1;
                        }
                    }
                }
                Position::EnteredInnerCore => {
                    let Token::InnerCore(wave) = token else {
                        return Err(unexpected(token));
                    };
                    legs.push(PlannedLeg::Down {
                        wave,
                        from: Station::Icb,
                        to: LegSpan::Turn(TurnRegion::InnerCore),
                    });
                    legs.push(PlannedLeg::Up {
                        wave,
                        from: LegSpan::Turn(TurnRegion::InnerCore),
                        to: Station::Icb,
                    });
                    position = Position::LeftInnerCore;
                    index += 1;
                }
                Position::LeftInnerCore => {
                    if token != Token::OuterCore {
                        return Err(unexpected(token));
                    }
                    legs.push(PlannedLeg::Up {
                        wave: WaveType::P,
                        from: LegSpan::Fixed(Station::Icb),
                        to: Station::Cmb,
                    });
                    position = Position::BelowMantle;
                    index += 1;
                }
                Position::BelowMantle => match token {
                    // Underside reflection off the core-mantle boundary.
                    Token::OuterCore => position = Position::EnteredOuterCore,
                    Token::Mantle(wave) => {
                        legs.push(PlannedLeg::Up {
                            wave,
                            from: LegSpan::Fixed(Station::Cmb),
                            to: Station::Surface,
                        });
                        position = Position::Surface;
                        index += 1;
                    }
                    _ => return Err(unexpected(token)),
                },
            }
        }

        if position != Position::Surface {
            return Err(PhaseError::Unterminated {
                phase: name.to_string(),
            });
        }

        Ok(Self {
            name: name.to_string(),
            legs,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn legs(&self) -> &[PlannedLeg] {
        &self.legs
    }

    /// Wave type leaving the source.
    pub fn first_wave(&self) -> WaveType {
        self.legs[0].wave()
    }

    pub fn diffracted_wave(&self) -> Option<WaveType> {
        self.legs.iter().find_map(|leg| match leg {
            PlannedLeg::Diffracted { wave } => Some(*wave),
            _ => None,
        })
    }
}

impl Display for PhasePlan {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

fn tokenize(name: &str) -> Result<Vec<Token>, PhaseError> {
    if name.is_empty() {
        return Err(PhaseError::Empty);
    }

    let mut tokens = Vec::new();
    let mut rest = name;
    let mut position = 0;
    while let Some(symbol) = rest.chars().next() {
        if let Some(after) = rest.strip_prefix("diff") {
            let Some(Token::Mantle(wave)) = tokens.pop() else {
                return Err(PhaseError::UnknownSymbol {
                    phase: name.to_string(),
                    symbol: "diff".to_string(),
                    position,
                });
            };
            tokens.push(Token::MantleDiff(wave));
            rest = after;
            position += 4;
            continue;
        }

        let token = match symbol {
            'p' if tokens.is_empty() => Token::DepthLeg(WaveType::P),
            's' if tokens.is_empty() => Token::DepthLeg(WaveType::S),
            'P' => Token::Mantle(WaveType::P),
            'S' => Token::Mantle(WaveType::S),
            'c' => Token::CmbReflection,
            'K' => Token::OuterCore,
            'i' => Token::IcbReflection,
            'I' => Token::InnerCore(WaveType::P),
            'J' => Token::InnerCore(WaveType::S),
            _ => {
                return Err(PhaseError::UnknownSymbol {
                    phase: name.to_string(),
                    symbol: symbol.to_string(),
                    position,
                });
            }
        };
        tokens.push(token);
        rest = &rest[symbol.len_utf8()..];
        position += 1;
    }

    Ok(tokens)
}
