use crate::types::*;
use std::cmp::Ordering;

/// Recompute every player's total from raw counters. Always whole-cohort:
/// the efficiency bonus is relative to all current Conversationalists, so a
/// change to any one player's counters can move another player's total.
pub fn recompute_scores(players: &mut [Player]) {
    let reply_counts: Vec<u32> = players
        .iter()
        .filter(|p| p.role == Some(Role::Conversationalist))
        .map(|p| p.score.replies)
        .collect();
    let min_replies = reply_counts.iter().min().copied();

    // +5 to the first Conversationalist (insertion order) at the minimum
    // reply count, +2 to the first at exactly min+1, 0 to everyone else.
    let mut bonus_five_given = false;
    let mut bonus_two_given = false;

    for player in players.iter_mut() {
        let mut bonus = 0;
        if player.role == Some(Role::Conversationalist) {
            if let Some(min) = min_replies {
                if player.score.replies == min && !bonus_five_given {
                    bonus = 5;
                    bonus_five_given = true;
                } else if player.score.replies == min + 1 && !bonus_two_given {
                    bonus = 2;
                    bonus_two_given = true;
                }
            }
        }
        player.score.efficiency_bonus = bonus;

        let s = &player.score;
        player.score.total = i64::from(s.verified_points) * 10
            + i64::from(s.direct_answers) * 2
            - i64::from(s.red_flags_received) * 8
            - i64::from(s.yellow_flags_received) * 3
            - i64::from(s.replies)
            - i64::from(s.lifelines_used)
            + bonus;
    }
}

/// Deterministic ranking: total descending, then fewer red flags, then
/// fewer replies, then name order.
fn rank(a: &Player, b: &Player) -> Ordering {
    b.score
        .total
        .cmp(&a.score.total)
        .then(a.score.red_flags_received.cmp(&b.score.red_flags_received))
        .then(a.score.replies.cmp(&b.score.replies))
        .then(a.name.cmp(&b.name))
}

/// Pick the winner at game end. Candidates are the Conversationalists, or
/// every player if nobody holds that role.
pub fn determine_winner(players: &[Player]) -> Option<WinnerSummary> {
    let mut pool: Vec<&Player> = players
        .iter()
        .filter(|p| p.role == Some(Role::Conversationalist))
        .collect();
    if pool.is_empty() {
        pool = players.iter().collect();
    }
    pool.sort_by(|a, b| rank(a, b));

    let winner = pool.first()?;
    let reason = match pool.get(1) {
        Some(second) if second.score.total == winner.score.total => {
            if winner.score.red_flags_received != second.score.red_flags_received {
                "won tie-break on fewer red flags".to_string()
            } else if winner.score.replies != second.score.replies {
                "won tie-break on fewer replies".to_string()
            } else {
                "won tie-break on name order".to_string()
            }
        }
        _ => "highest total score".to_string(),
    };

    Some(WinnerSummary {
        player_id: winner.id.clone(),
        player_name: winner.name.clone(),
        score: winner.score.total,
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conversationalist(id: &str, name: &str) -> Player {
        let mut p = Player::new(id.to_string(), name.to_string(), 1);
        p.role = Some(Role::Conversationalist);
        p
    }

    #[test]
    fn test_total_matches_formula() {
        let mut p = conversationalist("p1", "Alice");
        p.score.verified_points = 2;
        p.score.direct_answers = 3;
        p.score.red_flags_received = 1;
        p.score.yellow_flags_received = 2;
        p.score.replies = 4;
        p.score.lifelines_used = 1;
        let mut players = vec![p];

        recompute_scores(&mut players);

        // 20 + 6 - 8 - 6 - 4 - 1 + 5 (sole Conversationalist gets the bonus)
        assert_eq!(players[0].score.efficiency_bonus, 5);
        assert_eq!(players[0].score.total, 12);
    }

    #[test]
    fn test_efficiency_bonus_distribution() {
        let mut a = conversationalist("a", "A");
        let mut b = conversationalist("b", "B");
        let mut c = conversationalist("c", "C");
        a.score.replies = 1;
        b.score.replies = 2;
        c.score.replies = 5;
        let mut players = vec![a, b, c];

        recompute_scores(&mut players);

        assert_eq!(players[0].score.efficiency_bonus, 5);
        assert_eq!(players[1].score.efficiency_bonus, 2);
        assert_eq!(players[2].score.efficiency_bonus, 0);
    }

    #[test]
    fn test_efficiency_bonus_ties_resolved_by_insertion_order() {
        let mut a = conversationalist("a", "A");
        let mut b = conversationalist("b", "B");
        let mut c = conversationalist("c", "C");
        a.score.replies = 2;
        b.score.replies = 2;
        c.score.replies = 3;
        let mut players = vec![a, b, c];

        recompute_scores(&mut players);

        // Exactly one +5 (first at min) and one +2 (first at min+1)
        assert_eq!(players[0].score.efficiency_bonus, 5);
        assert_eq!(players[1].score.efficiency_bonus, 0);
        assert_eq!(players[2].score.efficiency_bonus, 2);
    }

    #[test]
    fn test_no_bonus_without_conversationalists() {
        let mut referee = Player::new("r".to_string(), "Ref".to_string(), 1);
        referee.role = Some(Role::Referee);
        referee.score.verified_points = 1;
        let mut players = vec![referee];

        recompute_scores(&mut players);

        assert_eq!(players[0].score.efficiency_bonus, 0);
        assert_eq!(players[0].score.total, 10);
    }

    #[test]
    fn test_winner_prefers_conversationalists() {
        let mut referee = Player::new("r".to_string(), "Ref".to_string(), 1);
        referee.role = Some(Role::Referee);
        referee.score.total = 100;
        let mut conv = conversationalist("c", "Carol");
        conv.score.total = 1;
        let players = vec![referee, conv];

        let winner = determine_winner(&players).unwrap();
        assert_eq!(winner.player_id, "c");
    }

    #[test]
    fn test_winner_tie_breaks() {
        // Equal totals: fewer red flags wins
        let mut a = conversationalist("a", "A");
        let mut b = conversationalist("b", "B");
        a.score.total = 10;
        b.score.total = 10;
        a.score.red_flags_received = 2;
        b.score.red_flags_received = 1;
        let winner = determine_winner(&[a.clone(), b.clone()]).unwrap();
        assert_eq!(winner.player_id, "b");
        assert_eq!(winner.reason, "won tie-break on fewer red flags");

        // Equal red flags: fewer replies wins
        a.score.red_flags_received = 1;
        a.score.replies = 3;
        b.score.replies = 5;
        let winner = determine_winner(&[a.clone(), b.clone()]).unwrap();
        assert_eq!(winner.player_id, "a");
        assert_eq!(winner.reason, "won tie-break on fewer replies");

        // Equal replies: alphabetical by name
        a.score.replies = 5;
        let winner = determine_winner(&[a, b]).unwrap();
        assert_eq!(winner.player_name, "A");
        assert_eq!(winner.reason, "won tie-break on name order");
    }

    #[test]
    fn test_winner_none_for_empty_pool() {
        assert!(determine_winner(&[]).is_none());
    }
}
