/*!

This is the long-form manual for `voting_rules` and `tally`.

## Ballots

The following ballot formats are supported:
* order ballots, written as weak orders: `a > b ~ c > d`
* grades (levels): a map from candidates to numbers, such as `{"a": 1, "b": 0}` in JSON
* plurality ballots: a single chosen candidate
* veto ballots: a single rejected candidate

### Weak orders

`>` separates the tie-classes, best first, and `~` joins tied candidates. Candidate names are
made of ASCII letters, digits and underscores. Spaces around the separators are ignored.

```text
Anna ~ Bob > Clara > Dave
```

In this example, `Anna` and `Bob` are tied at the top. A voter may rank only some of the
candidates: the unranked ones are tied at the bottom of the ballot.

## Rules

All the rules share the same outputs:
* `scores`: the score of each candidate (not every rule has scores)
* `order`: the weak order over the candidates
* `strict_order`: the order, with the ties broken by the tie-break of the rule
* `winner`: the first candidate of the strict order
* `cowinners`: the candidates tied at the top of the order

The tie-break (a `Priority`) is one of `unambiguous` (any tie is an error, the default),
`ascending`, `descending`, `random` (with a seed) or `given` (an explicit list of candidates).

Simple rules:
* `plurality`, `veto`, `borda`: the weighted sum of the points given by each ballot
* `approval`: the proportion of approvals. Order ballots approve the top half of their
  ranked candidates
* `rangeVoting`: the average grade, on an integer scale
* `maximin`: the worst result of a candidate in its duels against the others

Composite rules:
* `iteratedElimination`: a base rule and an elimination, repeated until every candidate is
  eliminated. With `plurality` and `last(1)`, it is the instant-runoff voting.
* `sequentialElimination`: a fixed list of rules and eliminations. If a round eliminates
  every remaining candidate, it is the final round.
* `twoRound`: plurality, only the two best candidates qualify, plurality again.
* `sequentialTieBreak`: the first rule decides, the next rules break its ties.

Eliminations:
* `last(k)`: eliminates the `k` worst candidates. A tie-class is never split, so more
  candidates may be eliminated. A negative `k` eliminates all the candidates but the best
  `-k`, with the same rule, so fewer may qualify.
* `belowAverage`: eliminates the candidates whose score is strictly below the average. If all
  the scores are equal, every candidate is eliminated.

An elimination that would not eliminate anybody is an error.

## Configuration

`tally` reads an election described in JSON:

```text
{
  "candidates": ["a", "b", "c"],
  "ballots": [
    {"ballot": "a > b > c", "weight": 4},
    {"ballot": "b > c > a", "weight": 3, "voter": "v2"},
    {"ballot": {"a": 1, "b": 0}}
  ],
  "ballotsFile": "ballots.csv",
  "rule": {
    "type": "iteratedElimination",
    "baseRule": {"type": "plurality"},
    "elimination": {"type": "last", "k": 1},
    "tieBreak": {"type": "ascending"}
  }
}
```

The `candidates`, `ballots` and `ballotsFile` fields are optional, but some ballots must be
given. The candidates default to all the candidates mentioned by the ballots.

`ballotsFile` is a CSV file, relative to the configuration file, with a header row and the
columns `weight`, `ballot` and optionally `voter`:

```text
weight,ballot,voter
4,a > b > c,v1
3,b > c > a,
```

 */
