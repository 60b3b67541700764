//! Split validation.
//!
//! [`validate_splits`] runs the pure checks in a fixed order and stops at the
//! first failure:
//!
//! 1. the total is positive and no split amount is negative;
//! 2. the split list is not empty and names each user at most once;
//! 3. split amounts add up to the total exactly.
//!
//! Membership of the payer and participants needs the store and is checked
//! afterwards with [`ValidatedSplits::ensure_members`].

use std::collections::HashSet;

use uuid::Uuid;

use crate::{
    Money, ResultEngine, ValidationError, commands::SplitInput, expense_splits::ExpenseSplit,
    membership::MembershipOracle,
};

/// Splits that passed the arithmetic checks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedSplits {
    total: Money,
    splits: Vec<SplitInput>,
}

impl ValidatedSplits {
    pub fn total(&self) -> Money {
        self.total
    }

    pub fn splits(&self) -> &[SplitInput] {
        &self.splits
    }

    /// Checks the payer first, then every participant in the order given.
    ///
    /// Stops at the first user that is not a member.
    pub async fn ensure_members<O>(&self, oracle: &O, group_id: Uuid, payer: Uuid) -> ResultEngine<()>
    where
        O: MembershipOracle,
    {
        if !oracle.is_member(group_id, payer).await? {
            return Err(ValidationError::NonMemberPayer(payer).into());
        }
        for split in &self.splits {
            if !oracle.is_member(group_id, split.user_id).await? {
                return Err(ValidationError::NonMemberParticipant(split.user_id).into());
            }
        }
        Ok(())
    }

    pub(crate) fn into_rows(self, expense_id: Uuid) -> Vec<ExpenseSplit> {
        self.splits
            .into_iter()
            .map(|split| ExpenseSplit {
                expense_id,
                user_id: split.user_id,
                amount: split.amount,
            })
            .collect()
    }
}

/// Validates an expense total against its proposed splits.
pub fn validate_splits(
    total: Money,
    splits: &[SplitInput],
) -> Result<ValidatedSplits, ValidationError> {
    if !total.is_positive() {
        return Err(ValidationError::NonPositiveTotal);
    }
    if splits.iter().any(|split| split.amount.is_negative()) {
        return Err(ValidationError::NegativeSplit);
    }

    if splits.is_empty() {
        return Err(ValidationError::EmptySplits);
    }
    let mut seen = HashSet::with_capacity(splits.len());
    for split in splits {
        if !seen.insert(split.user_id) {
            return Err(ValidationError::DuplicateParticipant(split.user_id));
        }
    }

    let sum: Money = splits.iter().map(|split| split.amount).sum();
    if sum != total {
        return Err(ValidationError::SplitSumMismatch { total, sum });
    }

    Ok(ValidatedSplits {
        total,
        splits: splits.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::EngineError;

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    struct FixedMembers(HashSet<(Uuid, Uuid)>);

    impl MembershipOracle for FixedMembers {
        async fn is_member(&self, group_id: Uuid, user_id: Uuid) -> ResultEngine<bool> {
            Ok(self.0.contains(&(group_id, user_id)))
        }
    }

    #[test]
    fn equal_thirds_are_accepted() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let splits = [
            SplitInput::new(a, money("33.33")),
            SplitInput::new(b, money("33.33")),
            SplitInput::new(c, money("33.34")),
        ];
        let validated = validate_splits(money("100.00"), &splits).unwrap();
        assert_eq!(validated.total(), money("100"));
        assert_eq!(validated.splits(), &splits);
    }

    #[test]
    fn one_cent_short_is_rejected() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let splits = [
            SplitInput::new(a, money("33.33")),
            SplitInput::new(b, money("33.33")),
            SplitInput::new(c, money("33.33")),
        ];
        let err = validate_splits(money("100.00"), &splits).unwrap_err();
        assert_eq!(
            err,
            ValidationError::SplitSumMismatch {
                total: money("100.00"),
                sum: money("99.99"),
            }
        );
    }

    #[test]
    fn zero_share_is_allowed() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let splits = [
            SplitInput::new(a, money("10.00")),
            SplitInput::new(b, Money::ZERO),
        ];
        assert!(validate_splits(money("10"), &splits).is_ok());
    }

    #[test]
    fn non_positive_total_wins_over_other_errors() {
        let a = Uuid::new_v4();
        let splits = [SplitInput::new(a, money("-1")), SplitInput::new(a, money("1"))];
        assert_eq!(
            validate_splits(Money::ZERO, &splits).unwrap_err(),
            ValidationError::NonPositiveTotal
        );
        assert_eq!(
            validate_splits(money("-5"), &[]).unwrap_err(),
            ValidationError::NonPositiveTotal
        );
    }

    #[test]
    fn negative_split_is_reported_before_duplicates() {
        let a = Uuid::new_v4();
        let splits = [SplitInput::new(a, money("-1")), SplitInput::new(a, money("2"))];
        assert_eq!(
            validate_splits(money("1"), &splits).unwrap_err(),
            ValidationError::NegativeSplit
        );
    }

    #[test]
    fn empty_and_duplicate_splits_are_rejected() {
        assert_eq!(
            validate_splits(money("1"), &[]).unwrap_err(),
            ValidationError::EmptySplits
        );

        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let splits = [
            SplitInput::new(a, money("0.50")),
            SplitInput::new(b, money("0.25")),
            SplitInput::new(a, money("0.25")),
        ];
        assert_eq!(
            validate_splits(money("1"), &splits).unwrap_err(),
            ValidationError::DuplicateParticipant(a)
        );
    }

    #[tokio::test]
    async fn membership_checks_payer_then_participants_in_order() {
        let group = Uuid::new_v4();
        let (payer, member, outsider_1, outsider_2) =
            (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let oracle = FixedMembers(HashSet::from([(group, payer), (group, member)]));

        let splits = [
            SplitInput::new(member, money("5")),
            SplitInput::new(outsider_1, money("3")),
            SplitInput::new(outsider_2, money("2")),
        ];
        let validated = validate_splits(money("10"), &splits).unwrap();
        let err = validated
            .ensure_members(&oracle, group, payer)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::Validation(ValidationError::NonMemberParticipant(outsider_1))
        );

        let err = validated
            .ensure_members(&oracle, group, outsider_2)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::Validation(ValidationError::NonMemberPayer(outsider_2))
        );
    }

    #[tokio::test]
    async fn membership_passes_when_everyone_belongs() {
        let group = Uuid::new_v4();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let oracle = FixedMembers(HashSet::from([(group, a), (group, b)]));
        let validated = validate_splits(
            money("20"),
            &[SplitInput::new(a, money("10")), SplitInput::new(b, money("10"))],
        )
        .unwrap();
        validated.ensure_members(&oracle, group, a).await.unwrap();
    }
}
