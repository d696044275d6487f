//! Fixed Gardiner sign-list alphabet: the category table every sign code is
//! validated against.
//!
//! Gardiner's sign list groups hieroglyphs into lettered categories (A = man
//! and his occupations, G = birds, ...). The letter J is unused; `Aa` holds
//! unclassified signs, and the extended `NL`/`NU`/`Ff` categories cover nome
//! signs and variant forms used by the TLA lemma dictionary.

use std::sync::OnceLock;

/// A Gardiner sign-list category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum Category {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    /// Unclassified signs.
    Aa,
    /// Nomes of Lower Egypt.
    Nl,
    /// Nomes of Upper Egypt.
    Nu,
    /// Variant forms (extended category used by the TLA dictionary).
    Ff,
}

/// One row of the category table.
#[derive(Debug, Clone, Copy)]
pub struct CategoryInfo {
    /// The category.
    pub category: Category,
    /// Canonical code prefix as written in sign codes.
    pub code: &'static str,
    /// Gardiner's description of the category.
    pub description: &'static str,
}

static TABLE: OnceLock<Vec<CategoryInfo>> = OnceLock::new();

fn build_table() -> Vec<CategoryInfo> {
    use Category::*;
    let row = |category, code, description| CategoryInfo {
        category,
        code,
        description,
    };
    vec![
        row(A, "A", "Man and his occupations"),
        row(B, "B", "Woman and her occupations"),
        row(C, "C", "Anthropomorphic deities"),
        row(D, "D", "Parts of the human body"),
        row(E, "E", "Mammals"),
        row(F, "F", "Parts of mammals"),
        row(G, "G", "Birds"),
        row(H, "H", "Parts of birds"),
        row(I, "I", "Amphibious animals, reptiles"),
        row(K, "K", "Fish and parts of fish"),
        row(L, "L", "Invertebrates and lesser animals"),
        row(M, "M", "Trees and plants"),
        row(N, "N", "Sky, earth, water"),
        row(O, "O", "Buildings and parts of buildings"),
        row(P, "P", "Ships and parts of ships"),
        row(Q, "Q", "Domestic and funerary furniture"),
        row(R, "R", "Temple furniture and sacred emblems"),
        row(S, "S", "Crowns, dress, staves"),
        row(T, "T", "Warfare, hunting, butchery"),
        row(U, "U", "Agriculture, crafts, professions"),
        row(V, "V", "Rope, fibre, baskets, bags"),
        row(W, "W", "Vessels of stone and earthenware"),
        row(X, "X", "Loaves and cakes"),
        row(Y, "Y", "Writings, games, music"),
        row(Z, "Z", "Strokes, geometrical figures"),
        row(Aa, "Aa", "Unclassified"),
        row(Nl, "NL", "Nomes of Lower Egypt"),
        row(Nu, "NU", "Nomes of Upper Egypt"),
        row(Ff, "Ff", "Variant forms"),
    ]
}

/// Get the full category table.
pub fn all_categories() -> &'static [CategoryInfo] {
    TABLE.get_or_init(build_table)
}

/// Look up a category by its code prefix (case-insensitive).
///
/// Two-letter codes (`Aa`, `NL`, `NU`, `Ff`) are matched before the
/// single-letter ones, so "aa" resolves to `Aa`, not `A`.
pub fn lookup(code: &str) -> Option<Category> {
    all_categories()
        .iter()
        .find(|info| info.code.eq_ignore_ascii_case(code))
        .map(|info| info.category)
}

impl Category {
    /// Canonical code prefix for this category.
    pub fn code(self) -> &'static str {
        all_categories()
            .iter()
            .find(|info| info.category == self)
            .map(|info| info.code)
            .unwrap_or("?")
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
