//! Output formatting utilities for CLI.

use conquest::{GameResult, PlayerId};
use serde::Serialize;

/// Format a single game result as human-readable text.
pub(super) fn format_game_text(result: &GameResult) -> String {
    let mut output = String::new();

    output.push_str(&format!("Game Result (seed: {})\n", result.seed));
    match result.winner {
        Some(winner) => output.push_str(&format!("  Winner: {winner}\n")),
        None => output.push_str("  Winner: Draw (turn bound reached)\n"),
    }
    output.push_str(&format!("  Turns: {}\n", result.turns_played));
    output.push_str(&format!("  Rejected commands: {}\n\n", result.rejected));

    for player in PlayerId::ALL {
        let i = player.index();
        output.push_str(&format!(
            "  {player}: {} territories, {} troops, {} actions\n",
            result.final_territories[i], result.final_troops[i], result.actions[i]
        ));
    }

    output
}

/// Aggregated self-play statistics.
#[derive(Debug, Default, Clone, Copy)]
pub(super) struct SelfplayStats {
    /// Total games played.
    pub(super) games_played: u64,
    /// Win count per player.
    pub(super) wins: [u64; 2],
    /// Games that hit the turn bound.
    pub(super) draws: u64,
    /// Games abandoned because nobody could act.
    pub(super) stalled: u64,
    /// Total turns across all games.
    total_turns: u64,
    /// Total rejected commands across all games.
    total_rejected: u64,
}

impl SelfplayStats {
    /// Add a game result to the stats.
    pub(super) fn add_result(&mut self, result: &GameResult) {
        self.games_played += 1;
        self.total_turns += u64::from(result.turns_played);
        self.total_rejected += result.rejected;
        match result.winner {
            Some(winner) => self.wins[winner.index()] += 1,
            None => self.draws += 1,
        }
    }

    /// Count a game that was abandoned.
    pub(super) fn add_stalled(&mut self) {
        self.stalled += 1;
    }

    /// Merge another set of stats into this one.
    pub(super) fn merge(&mut self, other: &Self) {
        self.games_played += other.games_played;
        self.wins[0] += other.wins[0];
        self.wins[1] += other.wins[1];
        self.draws += other.draws;
        self.stalled += other.stalled;
        self.total_turns += other.total_turns;
        self.total_rejected += other.total_rejected;
    }

    /// Win rate of `player` (0.0-1.0).
    #[allow(clippy::cast_precision_loss)]
    pub(super) fn win_rate(&self, player: PlayerId) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.wins[player.index()] as f64 / self.games_played as f64
    }

    /// Draw rate (0.0-1.0).
    #[allow(clippy::cast_precision_loss)]
    pub(super) fn draw_rate(&self) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.draws as f64 / self.games_played as f64
    }

    /// Average game length.
    #[allow(clippy::cast_precision_loss)]
    pub(super) fn avg_turns(&self) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.total_turns as f64 / self.games_played as f64
    }

    /// Average rejected commands per game.
    #[allow(clippy::cast_precision_loss)]
    pub(super) fn avg_rejected(&self) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.total_rejected as f64 / self.games_played as f64
    }
}

/// JSON-serializable self-play result.
#[derive(Debug, Serialize)]
pub(super) struct JsonSelfplayResult {
    /// Total games played.
    games_played: u64,
    /// Per-player statistics.
    players: Vec<JsonSelfplayPlayer>,
    /// Number of draws.
    draws: u64,
    /// Number of stalled games.
    stalled: u64,
    /// Average game length in turns.
    avg_turns: f64,
    /// Average rejected commands per game.
    avg_rejected: f64,
}

/// JSON-serializable per-player self-play stats.
#[derive(Debug, Serialize)]
pub(super) struct JsonSelfplayPlayer {
    /// Player number (1 or 2).
    player: u8,
    /// Number of wins.
    wins: u64,
    /// Win rate (0.0-1.0).
    win_rate: f64,
}

impl JsonSelfplayResult {
    /// Create from stats.
    pub(super) fn from_stats(stats: &SelfplayStats) -> Self {
        let players = PlayerId::ALL
            .iter()
            .map(|&player| JsonSelfplayPlayer {
                player: player.number(),
                wins: stats.wins[player.index()],
                win_rate: stats.win_rate(player),
            })
            .collect();

        Self {
            games_played: stats.games_played,
            players,
            draws: stats.draws,
            stalled: stats.stalled,
            avg_turns: stats.avg_turns(),
            avg_rejected: stats.avg_rejected(),
        }
    }
}

/// Format self-play stats as human-readable text.
pub(super) fn format_selfplay_text(stats: &SelfplayStats) -> String {
    let mut output = String::new();

    output.push_str(&format!("Self-play Results ({} games)\n", stats.games_played));
    output.push_str("========================================\n\n");

    output.push_str("Win Rates:\n");
    for player in PlayerId::ALL {
        output.push_str(&format!(
            "  {player}: {:.1}% ({} wins)\n",
            stats.win_rate(player) * 100.0,
            stats.wins[player.index()]
        ));
    }
    output.push_str(&format!(
        "  Draws: {} ({:.1}%)\n",
        stats.draws,
        stats.draw_rate() * 100.0
    ));
    if stats.stalled > 0 {
        output.push_str(&format!("  Stalled: {}\n", stats.stalled));
    }

    output.push_str(&format!(
        "\nAverage Game Length: {:.0} turns\n",
        stats.avg_turns()
    ));
    output.push_str(&format!(
        "Average Rejected Commands: {:.1}\n",
        stats.avg_rejected()
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(winner: Option<PlayerId>, turns: u32) -> GameResult {
        GameResult {
            winner,
            turns_played: turns,
            actions: [10, 12],
            rejected: 2,
            final_troops: [50, 0],
            final_territories: [42, 0],
            seed: 7,
        }
    }

    #[test]
    fn test_merge_matches_sequential_adds() {
        let games = [
            result(Some(PlayerId::One), 40),
            result(Some(PlayerId::Two), 60),
            result(None, 150),
        ];

        let mut sequential = SelfplayStats::default();
        for game in &games {
            sequential.add_result(game);
        }

        let mut left = SelfplayStats::default();
        left.add_result(&games[0]);
        let mut right = SelfplayStats::default();
        right.add_result(&games[1]);
        right.add_result(&games[2]);
        left.merge(&right);

        assert_eq!(left.games_played, 3);
        assert_eq!(left.wins, sequential.wins);
        assert_eq!(left.draws, 1);
        assert!((left.avg_turns() - sequential.avg_turns()).abs() < 1e-9);
    }

    #[test]
    fn test_selfplay_text_lines() {
        let mut stats = SelfplayStats::default();
        stats.add_result(&result(Some(PlayerId::One), 40));
        stats.add_result(&result(None, 150));
        stats.add_stalled();

        let text = format_selfplay_text(&stats);
        assert!(text.starts_with("Self-play Results (2 games)\n"));
        assert!(text.contains("  Draws: 1 ("));
        assert!(text.contains("  Stalled: 1\n"));
        assert!(text.ends_with("Average Rejected Commands: 2.0\n"), "{text}");
    }

    #[test]
    fn test_game_text_names_winner() {
        let text = format_game_text(&result(Some(PlayerId::Two), 33));
        assert!(text.contains("Winner: P2"));
        assert!(text.contains("Turns: 33"));
    }
}
