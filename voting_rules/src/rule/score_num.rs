use std::sync::Arc;

use log::debug;

use crate::converter::{
    Converter, ConverterGeneral, ConverterToGrades, ConverterToOrder, ConverterToPlurality,
    ConverterToVeto,
};
use crate::error::RuleResult;
use crate::memo::Memo;
use crate::order::*;
use crate::priority::Priority;
use crate::rule::{Rule, RuleBase};
use crate::scorer::*;

/// How the contributions of the ballots are combined into the score of a candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Aggregation {
    /// The weighted sum of the contributions.
    Sum,
    /// The weighted average of the contributions. A candidate with a total weight of 0 gets
    /// `default`.
    Average { default: f64 },
}

/// A rule whose scores aggregate the contribution of each ballot, as given by a [`Scorer`].
#[derive(Debug)]
pub struct RuleScoreNum {
    name: String,
    base: RuleBase,
    scorer: Arc<dyn Scorer>,
    aggregation: Aggregation,
    // The weighted sums of the contributions and the sums of the weights.
    totals: Memo<(Scores, Scores)>,
    scores: Memo<Scores>,
}

impl RuleScoreNum {
    pub fn new(
        name: &str,
        converter: Arc<dyn Converter>,
        scorer: Arc<dyn Scorer>,
        aggregation: Aggregation,
    ) -> RuleScoreNum {
        RuleScoreNum {
            name: name.to_string(),
            base: RuleBase::new(converter, Priority::default()),
            scorer,
            aggregation,
            totals: Memo::new(),
            scores: Memo::new(),
        }
    }

    /// One point for the favourite candidate of each voter.
    pub fn plurality() -> RuleScoreNum {
        RuleScoreNum::new(
            "plurality",
            Arc::new(ConverterToPlurality::default()),
            Arc::new(ScorerPlurality),
            Aggregation::Sum,
        )
    }

    /// Minus one point for the least liked candidate of each voter.
    pub fn veto() -> RuleScoreNum {
        RuleScoreNum::new(
            "veto",
            Arc::new(ConverterToVeto::default()),
            Arc::new(ScorerVeto),
            Aggregation::Sum,
        )
    }

    pub fn borda() -> RuleScoreNum {
        RuleScoreNum::new(
            "borda",
            Arc::new(ConverterToOrder),
            Arc::new(ScorerBorda),
            Aggregation::Sum,
        )
    }

    /// The proportion of the voters who approve each candidate.
    ///
    /// Order ballots approve the top half of their ranked candidates.
    pub fn approval() -> RuleScoreNum {
        RuleScoreNum::new(
            "approval",
            Arc::new(ConverterToGrades::new(0, 1)),
            Arc::new(ScorerLevels),
            Aggregation::Average { default: 0.0 },
        )
    }

    /// The average grade of each candidate, on the scale `[low, high]`.
    pub fn range_voting(low: i64, high: i64) -> RuleScoreNum {
        RuleScoreNum::new(
            "range_voting",
            Arc::new(ConverterToGrades::new(low, high)),
            Arc::new(ScorerLevels),
            Aggregation::Average {
                default: low as f64,
            },
        )
    }

    /// Scores the ballots as they are given, without conversion.
    pub fn with_scorer(name: &str, scorer: Arc<dyn Scorer>) -> RuleScoreNum {
        RuleScoreNum::new(name, Arc::new(ConverterGeneral), scorer, Aggregation::Sum)
    }

    pub fn aggregation(&self) -> Aggregation {
        self.aggregation
    }

    fn totals(&self) -> RuleResult<&(Scores, Scores)> {
        self.totals.get_or_try_init(|| {
            let candidates = self.candidates()?;
            let zeros: Scores = candidates.iter().map(|c| (c.clone(), 0.0)).collect();
            let mut gross = zeros.clone();
            let mut weights = zeros;
            for item in self.converted_profile()?.items() {
                let contribution =
                    self.scorer
                        .scores(&item.ballot, item.voter.as_deref(), candidates)?;
                for (c, v) in contribution.iter() {
                    if let Some(g) = gross.get_mut(c) {
                        *g += item.weight * v;
                    }
                    if let Some(w) = weights.get_mut(c) {
                        *w += item.weight;
                    }
                }
            }
            Ok((gross, weights))
        })
    }

    /// The weighted sum of the contributions of the ballots, for each candidate.
    pub fn gross_scores(&self) -> RuleResult<&Scores> {
        Ok(&self.totals()?.0)
    }

    /// The total weight of the ballots that contributed to each candidate.
    pub fn weights(&self) -> RuleResult<&Scores> {
        Ok(&self.totals()?.1)
    }
}

impl Rule for RuleScoreNum {
    fn name(&self) -> &str {
        &self.name
    }

    fn base(&self) -> &RuleBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RuleBase {
        &mut self.base
    }

    fn fresh(&self) -> Box<dyn Rule> {
        Box::new(RuleScoreNum {
            name: self.name.clone(),
            base: self.base.fresh(),
            scorer: self.scorer.clone(),
            aggregation: self.aggregation,
            totals: Memo::new(),
            scores: Memo::new(),
        })
    }

    fn clear_cache(&mut self) {
        self.totals.clear();
        self.scores.clear();
    }

    fn scores(&self) -> RuleResult<&Scores> {
        self.scores.get_or_try_init(|| {
            let (gross, weights) = self.totals()?;
            let res: Scores = match self.aggregation {
                Aggregation::Sum => gross.clone(),
                Aggregation::Average { default } => gross
                    .iter()
                    .map(|(c, g)| {
                        let w = weights.get(c).cloned().unwrap_or(0.0);
                        (c.clone(), if w > 0.0 { g / w } else { default })
                    })
                    .collect(),
            };
            debug!("scores: rule {}: {:?}", self.name, res);
            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ballot::Ballot;
    use crate::error::RuleError;
    use crate::profile::Profile;
    use std::collections::BTreeMap;

    fn scores(items: &[(&str, f64)]) -> Scores {
        items.iter().map(|(c, v)| (c.to_string(), *v)).collect()
    }

    #[test]
    fn borda_with_weights() {
        let profile =
            Profile::parse_weighted(&["a > b > c > d > e", "b > c > d > e > a"], &[2.0, 1.0])
                .unwrap();
        let rule = RuleScoreNum::borda().with_profile(profile).unwrap();
        assert_eq!(
            rule.scores().unwrap(),
            &scores(&[("a", 8.0), ("b", 10.0), ("c", 7.0), ("d", 4.0), ("e", 1.0)])
        );
        assert_eq!(rule.winner().unwrap(), "b");
    }

    #[test]
    fn plurality_counts_first_choices() {
        let profile = Profile::parse_weighted(&["a > b > c", "b > a > c", "c > a > b"], &[2.0, 3.0, 4.0])
            .unwrap();
        let rule = RuleScoreNum::plurality().with_profile(profile).unwrap();
        assert_eq!(
            rule.scores().unwrap(),
            &scores(&[("a", 2.0), ("b", 3.0), ("c", 4.0)])
        );
        assert_eq!(rule.order().unwrap().len(), 3);
        assert_eq!(rule.winner().unwrap(), "c");
    }

    #[test]
    fn veto_of_the_last_candidate() {
        let profile = Profile::parse(&["a > b > c", "b > a > c", "c > a > b"]).unwrap();
        let rule = RuleScoreNum::veto().with_profile(profile).unwrap();
        assert_eq!(
            rule.scores().unwrap(),
            &scores(&[("a", 0.0), ("b", -1.0), ("c", -2.0)])
        );
    }

    #[test]
    fn approval_averages_the_grades() {
        let profile = Profile::parse(&["a > b > c > d", "c > a > b > d"]).unwrap();
        let rule = RuleScoreNum::approval()
            .with_tie_break(Priority::Ascending)
            .with_profile(profile)
            .unwrap();
        assert_eq!(
            rule.scores().unwrap(),
            &scores(&[("a", 1.0), ("b", 0.5), ("c", 0.5), ("d", 0.0)])
        );
        assert_eq!(rule.strict_order().unwrap(), &["a", "b", "c", "d"]);
    }

    #[test]
    fn range_voting_uses_the_weights_of_the_graders() {
        let mut g1 = BTreeMap::new();
        g1.insert("a".to_string(), 10.0);
        g1.insert("b".to_string(), 0.0);
        let mut g2 = BTreeMap::new();
        g2.insert("a".to_string(), 4.0);
        let profile = Profile::new(
            vec![Ballot::Levels(g1), Ballot::Levels(g2)],
            Some(vec![1.0, 3.0]),
            None,
        )
        .unwrap();
        let rule = RuleScoreNum::range_voting(0, 10)
            .with_profile(profile)
            .unwrap();
        assert_eq!(rule.gross_scores().unwrap(), &scores(&[("a", 22.0), ("b", 0.0)]));
        // The candidate `b` is graded 0 by the second ballot, which does not mention it.
        assert_eq!(rule.weights().unwrap(), &scores(&[("a", 4.0), ("b", 4.0)]));
        assert_eq!(rule.scores().unwrap(), &scores(&[("a", 5.5), ("b", 0.0)]));
    }

    #[test]
    fn conversion_errors_surface_on_read() {
        let profile = Profile::new(vec![Ballot::Veto(Some("a".to_string()))], None, None).unwrap();
        let mut rule = RuleScoreNum::plurality();
        rule.load(
            std::sync::Arc::new(profile),
            Some(["a", "b"].iter().map(|s| s.to_string()).collect()),
        )
        .unwrap();
        assert!(matches!(rule.scores(), Err(RuleError::Conversion { .. })));
        assert!(matches!(rule.winner(), Err(RuleError::Conversion { .. })));
    }

    #[test]
    fn empty_profile_gives_zero_scores() {
        let mut rule = RuleScoreNum::approval().with_tie_break(Priority::Ascending);
        rule.load(
            std::sync::Arc::new(Profile::default()),
            Some(["x", "y"].iter().map(|s| s.to_string()).collect()),
        )
        .unwrap();
        assert_eq!(rule.scores().unwrap(), &scores(&[("x", 0.0), ("y", 0.0)]));
        assert_eq!(rule.cowinners().unwrap().len(), 2);
        assert_eq!(rule.winner().unwrap(), "x");
    }
}
