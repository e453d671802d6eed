//! Pick ledger: the ordered record of picks for one room.
//!
//! Draft progress, claims and the next pick number are all derived from
//! here. Undone picks stay in the ledger as history but no longer count.

use time::OffsetDateTime;

/// One ledger row, independent of storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerPick {
    pub id: i64,
    pub season_game_id: i64,
    pub participant_id: i64,
    pub pick_number: i16,
    pub picked_at: OffsetDateTime,
    pub undo_deadline: OffsetDateTime,
    pub undone_at: Option<OffsetDateTime>,
}

impl LedgerPick {
    pub fn is_valid(&self) -> bool {
        self.undone_at.is_none()
    }
}

/// Broken ledger invariant, reported by [`PickLedger::verify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerViolation {
    /// Valid pick numbers are not exactly 0..k-1
    NumberGap { expected: i16, found: i16 },
    /// Two valid picks hold the same item
    DoubleClaim { season_game_id: i64 },
}

#[derive(Debug, Clone, Default)]
pub struct PickLedger {
    picks: Vec<LedgerPick>,
}

impl PickLedger {
    /// Build from every pick of a room, undone ones included.
    pub fn new(mut picks: Vec<LedgerPick>) -> Self {
        picks.sort_by_key(|p| (p.pick_number, p.id));
        Self { picks }
    }

    /// All rows in pick order, undone history included.
    pub fn all(&self) -> &[LedgerPick] {
        &self.picks
    }

    pub fn valid(&self) -> impl Iterator<Item = &LedgerPick> {
        self.picks.iter().filter(|p| p.is_valid())
    }

    pub fn valid_count(&self) -> usize {
        self.valid().count()
    }

    /// Pick number for the next commit; reuses a number freed by undo.
    pub fn next_pick_number(&self) -> i16 {
        // valid count never exceeds the 18 season games
        i16::try_from(self.valid_count()).unwrap_or(i16::MAX)
    }

    pub fn claimant_of(&self, season_game_id: i64) -> Option<&LedgerPick> {
        self.valid().find(|p| p.season_game_id == season_game_id)
    }

    pub fn is_claimed(&self, season_game_id: i64) -> bool {
        self.claimant_of(season_game_id).is_some()
    }

    /// Most recent valid pick.
    pub fn latest_valid(&self) -> Option<&LedgerPick> {
        self.valid().max_by_key(|p| (p.pick_number, p.id))
    }

    pub fn get(&self, pick_id: i64) -> Option<&LedgerPick> {
        self.picks.iter().find(|p| p.id == pick_id)
    }

    pub fn valid_by(&self, participant_id: i64) -> impl Iterator<Item = &LedgerPick> {
        self.valid().filter(move |p| p.participant_id == participant_id)
    }

    /// Check the contiguous-prefix and single-claimant invariants.
    pub fn verify(&self) -> Result<(), LedgerViolation> {
        let mut claimed = std::collections::HashSet::new();
        for (expected, pick) in self.valid().enumerate() {
            let expected = i16::try_from(expected).unwrap_or(i16::MAX);
            if pick.pick_number != expected {
                return Err(LedgerViolation::NumberGap {
                    expected,
                    found: pick.pick_number,
                });
            }
            if !claimed.insert(pick.season_game_id) {
                return Err(LedgerViolation::DoubleClaim {
                    season_game_id: pick.season_game_id,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use time::{Duration, OffsetDateTime};

    use super::*;

    fn pick(id: i64, game: i64, who: i64, number: i16) -> LedgerPick {
        let at = OffsetDateTime::UNIX_EPOCH + Duration::seconds(id);
        LedgerPick {
            id,
            season_game_id: game,
            participant_id: who,
            pick_number: number,
            picked_at: at,
            undo_deadline: at + Duration::seconds(30),
            undone_at: None,
        }
    }

    fn undone(mut p: LedgerPick) -> LedgerPick {
        p.undone_at = Some(p.picked_at + Duration::seconds(1));
        p
    }

    #[test]
    fn empty_ledger() {
        let ledger = PickLedger::default();
        assert_eq!(ledger.valid_count(), 0);
        assert_eq!(ledger.next_pick_number(), 0);
        assert!(ledger.latest_valid().is_none());
        assert_eq!(ledger.verify(), Ok(()));
    }

    #[test]
    fn undone_picks_free_number_and_item() {
        let ledger = PickLedger::new(vec![
            pick(1, 100, 1, 0),
            undone(pick(2, 101, 2, 1)),
            pick(3, 102, 2, 1),
        ]);
        assert_eq!(ledger.valid_count(), 2);
        assert_eq!(ledger.next_pick_number(), 2);
        assert!(!ledger.is_claimed(101));
        assert_eq!(ledger.claimant_of(102).map(|p| p.participant_id), Some(2));
        assert_eq!(ledger.latest_valid().map(|p| p.id), Some(3));
        assert_eq!(ledger.all().len(), 3);
        assert_eq!(ledger.verify(), Ok(()));
    }

    #[test]
    fn verify_reports_gap_and_double_claim() {
        let gap = PickLedger::new(vec![pick(1, 100, 1, 0), pick(2, 101, 2, 2)]);
        assert_eq!(
            gap.verify(),
            Err(LedgerViolation::NumberGap { expected: 1, found: 2 })
        );

        let double = PickLedger::new(vec![pick(1, 100, 1, 0), pick(2, 100, 2, 1)]);
        assert_eq!(
            double.verify(),
            Err(LedgerViolation::DoubleClaim { season_game_id: 100 })
        );
    }

    proptest! {
        // Replays random pick/undo sequences the way the commit protocol
        // appends to the ledger and checks the invariants after each step.
        #[test]
        fn appends_and_undos_keep_invariants(ops in prop::collection::vec((any::<bool>(), 0i64..18), 1..60)) {
            let mut rows: Vec<LedgerPick> = Vec::new();
            let mut next_id = 1;
            for (is_undo, game) in ops {
                let ledger = PickLedger::new(rows.clone());
                if is_undo {
                    if let Some(latest) = ledger.latest_valid().map(|p| p.id) {
                        if let Some(row) = rows.iter_mut().find(|r| r.id == latest) {
                            row.undone_at = Some(row.picked_at);
                        }
                    }
                } else if !ledger.is_claimed(game) {
                    rows.push(pick(next_id, game, next_id % 2, ledger.next_pick_number()));
                    next_id += 1;
                }
                let after = PickLedger::new(rows.clone());
                prop_assert_eq!(after.verify(), Ok(()));
                prop_assert!(after.valid_count() <= 18);
            }
        }
    }
}
