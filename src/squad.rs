#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl Position {
    /// Grid order, top to bottom.
    pub const DISPLAY_ORDER: [Position; 4] = [
        Position::Goalkeeper,
        Position::Defender,
        Position::Midfielder,
        Position::Forward,
    ];

    /// Order in which the backend concatenates `topPlayers`.
    pub const BACKEND_ORDER: [Position; 4] = [
        Position::Defender,
        Position::Midfielder,
        Position::Forward,
        Position::Goalkeeper,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Position::Goalkeeper => "GKP",
            Position::Defender => "DEF",
            Position::Midfielder => "MID",
            Position::Forward => "FWD",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Position::Goalkeeper => "Goalkeepers",
            Position::Defender => "Defenders",
            Position::Midfielder => "Midfielders",
            Position::Forward => "Forwards",
        }
    }
}

/// Per-position card counts handed to the player card grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SquadShape {
    pub goalkeepers: usize,
    pub defenders: usize,
    pub midfielders: usize,
    pub forwards: usize,
}

pub const STANDARD_SQUAD: SquadShape = SquadShape {
    goalkeepers: 2,
    defenders: 5,
    midfielders: 5,
    forwards: 3,
};

impl Default for SquadShape {
    fn default() -> Self {
        STANDARD_SQUAD
    }
}

impl SquadShape {
    pub fn count(&self, position: Position) -> usize {
        match position {
            Position::Goalkeeper => self.goalkeepers,
            Position::Defender => self.defenders,
            Position::Midfielder => self.midfielders,
            Position::Forward => self.forwards,
        }
    }

    pub fn count_mut(&mut self, position: Position) -> &mut usize {
        match position {
            Position::Goalkeeper => &mut self.goalkeepers,
            Position::Defender => &mut self.defenders,
            Position::Midfielder => &mut self.midfielders,
            Position::Forward => &mut self.forwards,
        }
    }

    pub fn total(&self) -> usize {
        Position::DISPLAY_ORDER
            .iter()
            .map(|pos| self.count(*pos))
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedPlayer {
    pub name: String,
    pub predicted_points: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerCard {
    pub position: Position,
    pub player: Option<RankedPlayer>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardRow {
    pub position: Position,
    pub cards: Vec<PlayerCard>,
}

/// Lays out the card grid for `shape`, filling cards from a backend
/// `topPlayers` list.
///
/// `split` holds the per-position counts the backend used to build the list
/// (standard for `/api/predict`, the requested counts for a custom request).
/// The list is cut in backend order with those counts; each position then
/// fills as many cards as `shape` asks for. Cards past the end of the
/// available players stay empty.
pub fn card_rows(
    shape: &SquadShape,
    split: &SquadShape,
    top_players: &[RankedPlayer],
) -> Vec<CardRow> {
    let mut by_position: Vec<(Position, &[RankedPlayer])> = Vec::with_capacity(4);
    let mut rest = top_players;
    for position in Position::BACKEND_ORDER {
        let take = split.count(position).min(rest.len());
        let (head, tail) = rest.split_at(take);
        by_position.push((position, head));
        rest = tail;
    }

    Position::DISPLAY_ORDER
        .iter()
        .map(|&position| {
            let available = by_position
                .iter()
                .find(|(pos, _)| *pos == position)
                .map(|(_, players)| *players)
                .unwrap_or(&[]);
            let cards = (0..shape.count(position))
                .map(|idx| PlayerCard {
                    position,
                    player: available.get(idx).cloned(),
                })
                .collect();
            CardRow { position, cards }
        })
        .collect()
}

/// Backend `optimizedTeam`, ranked for display.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamSummary {
    pub players: Vec<RankedPlayer>,
    pub total_points: f64,
}

pub fn team_summary(team: &[RankedPlayer]) -> TeamSummary {
    let mut players = team.to_vec();
    players.sort_by(|a, b| b.predicted_points.total_cmp(&a.predicted_points));
    let total_points = players.iter().map(|p| p.predicted_points).sum();
    TeamSummary {
        players,
        total_points,
    }
}
