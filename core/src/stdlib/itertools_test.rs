//! Tests for the `itertools` library.

use crate::api::{self, Context, Error};
use crate::values::Value;
use pretty_assertions::assert_eq;

fn eval(source: &str) -> Result<Value, Error> {
    api::eval(source, &Context::new())
}

fn repr(source: &str) -> String {
    eval(source)
        .unwrap_or_else(|e| panic!("evaluation should succeed for: {source}\nError: {e}"))
        .repr()
}

fn message(source: &str) -> String {
    match eval(source) {
        Ok(value) => panic!("expected {source} to fail, got {}", value.repr()),
        Err(err) => err.to_string(),
    }
}

#[test]
fn test_chain() {
    assert_eq!(repr("list(itertools.chain([1], 'ab', (2,)))"), "[1, 'a', 'b', 2]");
    assert_eq!(repr("list(itertools.chain())"), "[]");
    assert_eq!(repr("itertools.chain([])"), "<itertools.chain object>");
}

#[test]
fn test_results_are_one_shot() {
    assert_eq!(
        repr("[list(c) for c in [itertools.chain([1, 2])] for i in 'xy']"),
        "[[1, 2], []]"
    );
}

#[test]
fn test_product() {
    assert_eq!(
        repr("list(itertools.product('ab', [0, 1]))"),
        "[('a', 0), ('a', 1), ('b', 0), ('b', 1)]"
    );
    assert_eq!(
        repr("list(itertools.product([0, 1], repeat=2))"),
        "[(0, 0), (0, 1), (1, 0), (1, 1)]"
    );
    assert_eq!(repr("list(itertools.product())"), "[()]");
    assert_eq!(repr("list(itertools.product([1], []))"), "[]");
    assert_eq!(
        message("itertools.product([1], repeat=-1)"),
        "repeat argument cannot be negative"
    );
}

#[test]
fn test_product_size_is_checked_up_front() {
    assert_eq!(
        message("itertools.product(range(1000), repeat=10)"),
        "collection size exceeds the limit of 10000000 elements"
    );
}

#[test]
fn test_permutations() {
    assert_eq!(
        repr("list(itertools.permutations([1, 2, 3], 2))"),
        "[(1, 2), (1, 3), (2, 1), (2, 3), (3, 1), (3, 2)]"
    );
    assert_eq!(repr("len(list(itertools.permutations(range(4))))"), "24");
    assert_eq!(repr("list(itertools.permutations([1], 2))"), "[]");
    assert_eq!(message("itertools.permutations([1], -1)"), "r must be non-negative");
}

#[test]
fn test_combinations() {
    assert_eq!(
        repr("list(itertools.combinations('abcd', 2))"),
        "[('a', 'b'), ('a', 'c'), ('a', 'd'), ('b', 'c'), ('b', 'd'), ('c', 'd')]"
    );
    assert_eq!(repr("list(itertools.combinations([1, 2], 0))"), "[()]");
    assert_eq!(repr("list(itertools.combinations([1, 2], 3))"), "[]");
    assert_eq!(
        message("itertools.combinations([1, 2])"),
        "combinations() missing required argument 'r' (pos 2)"
    );
}

#[test]
fn test_islice() {
    assert_eq!(repr("list(itertools.islice('abcdef', 2))"), "['a', 'b']");
    assert_eq!(repr("list(itertools.islice('abcdef', 2, 4))"), "['c', 'd']");
    assert_eq!(repr("list(itertools.islice(range(10), 1, None, 3))"), "[1, 4, 7]");
    assert_eq!(repr("list(itertools.islice(range(10**6), 3))"), "[0, 1, 2]");
    assert_eq!(
        message("itertools.islice('abc', -1)"),
        "Stop argument for islice() must be None or an integer: 0 <= x <= sys.maxsize."
    );
    assert_eq!(
        message("itertools.islice('abc', 0, 3, 0)"),
        "Step for islice() must be a positive integer or None."
    );
}

#[test]
fn test_accumulate() {
    assert_eq!(repr("list(itertools.accumulate([1, 2, 3, 4]))"), "[1, 3, 6, 10]");
    assert_eq!(repr("list(itertools.accumulate([1, 2, 3], initial=10))"), "[10, 11, 13, 16]");
    assert_eq!(repr("list(itertools.accumulate([2, 3, 2], pow))"), "[2, 8, 64]");
    assert_eq!(repr("list(itertools.accumulate([], initial=5))"), "[5]");
}

#[test]
fn test_zip_longest() {
    assert_eq!(
        repr("list(itertools.zip_longest([1, 2, 3], 'ab'))"),
        "[(1, 'a'), (2, 'b'), (3, None)]"
    );
    assert_eq!(
        repr("list(itertools.zip_longest('a', [], fillvalue=0))"),
        "[('a', 0)]"
    );
    assert_eq!(repr("list(itertools.zip_longest())"), "[]");
}
