// The standard allow and deny lists.

pub(super) const BUILTINS: &[&str] = &[
    "set",
    "frozenset",
    "list",
    "tuple",
    "range",
    "sorted",
    "slice",
    "zip",
    "sum",
    "any",
    "all",
    "id",
    "type",
    "issubclass",
    "isinstance",
    "callable",
    "same_type",
    "float",
    "int",
    "str",
    "bytes",
    "bool",
    "abs",
    "len",
    "pow",
    "chr",
    "oct",
    "divmod",
    "hash",
    "repr",
    "ord",
    "round",
    "hex",
    "complex",
];

pub(super) const LIBRARIES: &[(&str, &[&str])] = &[
    (
        "string",
        &[
            "ascii_letters",
            "ascii_lowercase",
            "ascii_uppercase",
            "digits",
            "hexdigits",
            "octdigits",
            "punctuation",
            "whitespace",
            "printable",
            "capwords",
        ],
    ),
    (
        "math",
        &[
            "pi",
            "e",
            "tau",
            "inf",
            "nan",
            "ceil",
            "floor",
            "trunc",
            "sqrt",
            "exp",
            "log",
            "log2",
            "log10",
            "pow",
            "fabs",
            "fmod",
            "isclose",
            "isfinite",
            "isinf",
            "isnan",
            "gcd",
            "factorial",
            "sin",
            "cos",
            "tan",
            "degrees",
            "radians",
            "hypot",
        ],
    ),
    ("collections", &["Counter"]),
    (
        "itertools",
        &[
            "chain",
            "product",
            "permutations",
            "combinations",
            "islice",
            "accumulate",
            "zip_longest",
        ],
    ),
];

/// Call targets rejected at compile time, with the capability named in the
/// error message.
pub(super) const FORBIDDEN_CALLS: &[(&str, &str)] = &[("exec", "Exec"), ("eval", "Eval")];
