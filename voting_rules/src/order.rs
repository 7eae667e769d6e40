// ********* Candidates and orders ***********

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{ParseSnafu, RuleResult};

/// An opaque candidate identifier.
pub type Candidate = String;

/// A set of candidates. It is sorted, so that iterating over it is deterministic.
pub type CandidateSet = BTreeSet<Candidate>;

/// A ranking that permits ties: the tie-classes, best first.
///
/// Invariant: the tie-classes are non-empty, pairwise disjoint, and their union is the
/// candidate set of whoever produced the order.
pub type WeakOrder = Vec<CandidateSet>;

/// The score of every candidate.
pub type Scores = BTreeMap<Candidate, f64>;

/// Groups the candidates with equal scores, sorted by decreasing score.
pub fn order_from_scores(scores: &Scores) -> WeakOrder {
    let mut sorted: Vec<(&Candidate, f64)> = scores.iter().map(|(c, s)| (c, *s)).collect();
    // Stable sort: inside a tie-class, candidates stay in ascending order.
    sorted.sort_by(|(_, s1), (_, s2)| s2.total_cmp(s1));
    let mut res: WeakOrder = Vec::new();
    let mut last_score: Option<f64> = None;
    for (c, s) in sorted {
        match (last_score, res.last_mut()) {
            (Some(prev), Some(tie_class)) if prev == s => {
                tie_class.insert(c.clone());
            }
            _ => {
                res.push(BTreeSet::from([c.clone()]));
                last_score = Some(s);
            }
        }
    }
    res
}

/// All the candidates of a weak order.
pub fn flatten(order: &[CandidateSet]) -> CandidateSet {
    order.iter().flatten().cloned().collect()
}

/// True if the tie-classes of `order` are non-empty, disjoint, and cover exactly `candidates`.
pub fn is_partition(order: &[CandidateSet], candidates: &CandidateSet) -> bool {
    let mut seen: CandidateSet = BTreeSet::new();
    for tie_class in order.iter() {
        if tie_class.is_empty() {
            return false;
        }
        for c in tie_class.iter() {
            if !seen.insert(c.clone()) {
                return false;
            }
        }
    }
    seen == *candidates
}

/// The index of the tie-class of each candidate (0 is the best).
pub fn ranks(order: &[CandidateSet]) -> BTreeMap<Candidate, usize> {
    order
        .iter()
        .enumerate()
        .flat_map(|(idx, tie_class)| tie_class.iter().map(move |c| (c.clone(), idx)))
        .collect()
}

/// Keeps only the given candidates, dropping the tie-classes that become empty.
pub fn restrict_order(order: &[CandidateSet], candidates: &CandidateSet) -> WeakOrder {
    order
        .iter()
        .map(|tie_class| {
            tie_class
                .intersection(candidates)
                .cloned()
                .collect::<CandidateSet>()
        })
        .filter(|tie_class| !tie_class.is_empty())
        .collect()
}

/// Writes a weak order with the same syntax as `parse_weak_order`.
pub fn format_weak_order(order: &[CandidateSet]) -> String {
    order
        .iter()
        .map(|tie_class| {
            tie_class
                .iter()
                .map(|c| c.as_str())
                .collect::<Vec<&str>>()
                .join(" ~ ")
        })
        .collect::<Vec<String>>()
        .join(" > ")
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn parse_error<T>(input: &str, position: usize) -> RuleResult<T> {
    let found = input[position..]
        .chars()
        .next()
        .map(|c| c.to_string())
        .unwrap_or_else(|| "end of input".to_string());
    ParseSnafu {
        input,
        found,
        position,
    }
    .fail()
}

/// Parses a weak order such as `"Jean ~ Titi > moi > toi ~ nous"`.
///
/// `>` separates the tie-classes (best first) and `~` joins tied candidates. Names are made of
/// ASCII letters, digits and underscores. An empty or blank string is the empty order.
///
/// ```
/// use voting_rules::parse_weak_order;
///
/// let order = parse_weak_order("a ~ b > c")?;
/// assert_eq!(order.len(), 2);
/// assert!(order[0].contains("a") && order[0].contains("b"));
/// # Ok::<(), voting_rules::RuleError>(())
/// ```
pub fn parse_weak_order(input: &str) -> RuleResult<WeakOrder> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mut order: WeakOrder = Vec::new();
    let mut seen: CandidateSet = BTreeSet::new();
    let mut offset = 0;
    for class_str in input.split('>') {
        let mut tie_class: CandidateSet = BTreeSet::new();
        let mut name_offset = offset;
        for raw_name in class_str.split('~') {
            let leading = raw_name.len() - raw_name.trim_start().len();
            let name = raw_name.trim();
            if name.is_empty() {
                return parse_error(input, name_offset + raw_name.len());
            }
            let bad_char = name
                .find(|c: char| !is_name_char(c) && !c.is_whitespace())
                .or_else(|| name.find(char::is_whitespace));
            if let Some(idx) = bad_char {
                return parse_error(input, name_offset + leading + idx);
            }
            if !seen.insert(name.to_string()) {
                return parse_error(input, name_offset + leading);
            }
            tie_class.insert(name.to_string());
            name_offset += raw_name.len() + 1;
        }
        order.push(tie_class);
        offset += class_str.len() + 1;
    }
    Ok(order)
}
