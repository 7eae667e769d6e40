/*!

Composable voting rules.

A [`Rule`] turns a [`Profile`] of ballots into scores, a weak order over the candidates, a strict
order where the ties are broken by a [`Priority`], and a winner. Rules compose: an
[`Elimination`] removes candidates after a rule is evaluated, and the composite rules
[`RuleIteratedElimination`], [`RuleSequentialElimination`], [`RuleTwoRound`] and
[`RuleSequentialTieBreak`] chain rules and eliminations.

All the derived values are computed on first read and cached until the inputs change.

```
use voting_rules::{Elimination, Priority, Profile, Rule, RuleIteratedElimination, RuleScoreNum};
# use voting_rules::RuleError;

let profile = Profile::parse_weighted(&["a > b > c", "b > a > c", "c > a > b"], &[2.0, 3.0, 4.0])?;
let irv = RuleIteratedElimination::new(Box::new(RuleScoreNum::plurality()), Elimination::last(1))
    .with_tie_break(Priority::Ascending)
    .with_profile(profile)?;
assert_eq!(irv.winner()?, "b");
# Ok::<(), RuleError>(())
```

See the [manual] for the ballot syntax and the list of rules.
 */

mod ballot;
mod converter;
mod elimination;
mod error;
mod matrix;
mod memo;
mod order;
mod priority;
mod profile;
mod rule;
mod scorer;

pub mod builder;
pub mod manual;

pub use crate::ballot::*;
pub use crate::converter::*;
pub use crate::elimination::*;
pub use crate::error::{RuleError, RuleResult};
pub use crate::matrix::*;
pub use crate::order::*;
pub use crate::priority::*;
pub use crate::profile::*;
pub use crate::rule::*;
pub use crate::scorer::*;
