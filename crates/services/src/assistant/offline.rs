//! Canned explanations served when no language model is configured.

/// A built-in concept write-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Explanation {
    pub title: &'static str,
    pub body: &'static str,
}

pub const MEMOIZATION: Explanation = Explanation {
    title: "Memoization in Dynamic Programming (DP)",
    body: "\
Memoization stores the result of an expensive call and returns the cached value when the same inputs occur again, trading space for time.

**Key concepts**
1. Cache computed results
2. Top-down recursion with storage
3. Skip redundant work

**Example**
```rust
fn fib(n: u64, memo: &mut HashMap<u64, u64>) -> u64 {
    if n <= 1 {
        return n;
    }
    if let Some(&v) = memo.get(&n) {
        return v;
    }
    let v = fib(n - 1, memo) + fib(n - 2, memo);
    memo.insert(n, v);
    v
}
```

**Pitfalls**
1. Sharing one cache across unrelated problem instances
2. Deep recursion where tabulation would be simpler

**Complexity**
- Time: O(n), each subproblem is solved once
- Space: O(n) for the cache

**Applications**: path finding, edit distance, resource optimization, game theory.",
};

pub const DYNAMIC_PROGRAMMING: Explanation = Explanation {
    title: "Dynamic Programming (DP)",
    body: "\
Dynamic programming solves a problem by combining solutions to overlapping subproblems.

**Key concepts**
1. Optimal substructure
2. Overlapping subproblems
3. State transitions

**Approaches**
1. Top-down (memoization)
2. Bottom-up (tabulation)

**Example (tabulation)**
```rust
fn fib(n: usize) -> u64 {
    if n <= 1 {
        return n as u64;
    }
    let mut dp = vec![0u64; n + 1];
    dp[1] = 1;
    for i in 2..=n {
        dp[i] = dp[i - 1] + dp[i - 2];
    }
    dp[n]
}
```

**Pitfalls**
1. Missing base cases
2. Incorrect state transitions
3. Using DP where a greedy choice suffices

**When to use**: optimization and counting problems with overlapping subproblems.",
};

/// Shown when the question matches no built-in topic.
pub const AVAILABLE_TOPICS: &str = "\
I can explain these topics while offline:
- Memoization in Dynamic Programming
- Dynamic Programming (DP) concepts

Ask about one of them for a detailed explanation with examples.";

/// Pick a built-in explanation for `question`, if any matches.
#[must_use]
pub fn explain(question: &str) -> Option<Explanation> {
    let lowered = question.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let mentions_dp = lowered.contains("dynamic") || words.contains(&"dp");
    if lowered.contains("memo") {
        Some(MEMOIZATION)
    } else if mentions_dp {
        Some(DYNAMIC_PROGRAMMING)
    } else {
        None
    }
}
