/*
 * Library module tests: string, math, collections, itertools
 */

#[macro_use]
mod cases;

use sandeval::{Context, ErrorKind};

// ============================================================================
// Modules as values
// ============================================================================

test_case! {
    name: module_repr,
    input: "(math, string)",
    value: "(<module 'math'>, <module 'string'>)",
}

test_case! {
    name: unlisted_member,
    input: "math.frexp",
    error: Lookup,
    message: "module 'math' has no attribute 'frexp'",
}

test_case! {
    name: private_member,
    input: "math.__loader__",
    error: NamingPolicy,
    message: " \"__loader__\" is an invalid attribute name because it starts with \"_\".",
}

test_case! {
    name: modules_are_not_importable,
    input: "os",
    error: NameResolution,
    message: "name 'os' is not defined",
}

#[test]
fn every_standard_member_resolves() {
    let policy = sandeval::Policy::standard();
    let empty = Context::new();
    for library in policy.libraries() {
        for member in policy.library_members(library) {
            let source = format!("{library}.{member}");
            if let Err(e) = sandeval::eval(&source, &empty) {
                panic!("{source} should resolve: {e}");
            }
        }
    }
}

// ============================================================================
// string
// ============================================================================

test_case! {
    name: string_constants,
    input: "(string.digits, string.hexdigits, len(string.ascii_letters), len(string.printable))",
    value: "('0123456789', '0123456789abcdefABCDEF', 52, 100)",
}

test_case! {
    name: string_membership,
    input: "all(c in string.ascii_lowercase for c in 'abc') and '!' in string.punctuation",
    value: "True",
}

test_case! {
    name: capwords,
    input: "string.capwords('  hello   wORLD ')",
    value: "'Hello World'",
}

test_case! {
    name: capwords_with_separator,
    input: "string.capwords('a-b-c', '-')",
    value: "'A-B-C'",
}

// ============================================================================
// math
// ============================================================================

test_case! {
    name: math_functions,
    input: "(math.sqrt(16), math.floor(-0.5), math.gcd(12, 8), math.factorial(5))",
    value: "(4.0, -1, 4, 120)",
}

test_case! {
    name: math_domain_error,
    input: "math.sqrt(-1)",
    error: RuntimeType,
    message: "math domain error",
}

test_case! {
    name: math_with_context_values,
    input: "math.isclose(sum(resp.json()['values']) / 4, 2.5)",
    value: "True",
}

// ============================================================================
// collections
// ============================================================================

test_case! {
    name: counter_repr_orders_by_count,
    input: "collections.Counter('abbccc')",
    value: "Counter({'c': 3, 'b': 2, 'a': 1})",
}

test_case! {
    name: counter_missing_key_is_zero,
    input: "collections.Counter('ab')['z']",
    value: "0",
}

test_case! {
    name: counter_most_common,
    input: "collections.Counter([1, 2, 2, 3, 3, 3]).most_common(2)",
    value: "[(3, 3), (2, 2)]",
}

test_case! {
    name: counter_from_keywords,
    input: "collections.Counter(a=2, b=1).total()",
    value: "3",
}

test_case! {
    name: counter_elements,
    input: "sorted(collections.Counter(x=2, y=1).elements())",
    value: "['x', 'x', 'y']",
}

test_case! {
    name: counter_is_a_dict,
    input: "isinstance(collections.Counter(), type({})) and collections.Counter('a') == {'a': 1}",
    value: "True",
}

// ============================================================================
// itertools
// ============================================================================

test_case! {
    name: chain_of_json_lists,
    input: "list(itertools.chain(resp.json()['tags'], resp.json()['values']))",
    value: "['x', 'y', 1, 2, 3, 4]",
}

test_case! {
    name: pairs_with_combinations,
    input: "[a + b for a, b in itertools.combinations([1, 2, 3], 2)]",
    value: "[3, 4, 5]",
}

test_case! {
    name: running_total,
    input: "list(itertools.accumulate(resp.json()['values']))",
    value: "[1, 3, 6, 10]",
}

test_case! {
    name: islice_of_generator,
    input: "list(itertools.islice((i * i for i in range(10)), 3))",
    value: "[0, 1, 4]",
}

#[test]
fn itertools_results_are_iterators() {
    let err = cases::eval("itertools.chain([1])[0]").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RuntimeType);
    assert_eq!(err.message(), "'itertools.chain' object is not subscriptable");
}
