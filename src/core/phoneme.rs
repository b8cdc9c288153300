// File: src/core/phoneme.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// One sound of the simplified English alphabet the game is played with.
///
/// The serialized form of a phoneme is its key ("awe", "ch", ...), which is
/// also what the dictionary assets store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phoneme {
    Awe,
    Are,
    Aa,
    Eye,
    Ire,
    Ao,
    Our,
    Eh,
    Ey,
    Err,
    I,
    Ee,
    Ear,
    Oh,
    Or,
    Oy,
    Oo,
    U,
    Oor,
    Uh,
    Er,
    B,
    Ch,
    D,
    Dh,
    F,
    G,
    H,
    J,
    K,
    L,
    M,
    N,
    Ng,
    P,
    R,
    S,
    Sh,
    T,
    Th,
    V,
    W,
    Y,
    Z,
    Zh,
}

/// Articulatory tags attached to a phoneme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Vowel,
    Rhotic,
    Consonant,
    Voiced,
    Voiceless,
    Plosive,
    Affricate,
    Fricative,
    Nasal,
    Liquid,
    Glide,
    Approximant,
}

/// Static description of a phoneme. Example words mark the sound in brackets.
#[derive(Debug)]
pub struct PhonemeDescriptor {
    pub phoneme: Phoneme,
    pub key: &'static str,
    pub ipa: &'static str,
    /// Single character used by the compact transcript encoding.
    pub code: char,
    pub examples: &'static [&'static str],
    pub categories: &'static [Category],
}

impl PhonemeDescriptor {
    pub fn has_category(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }
}

use Category::*;

const VOWEL: &[Category] = &[Vowel];
const RHOTIC: &[Category] = &[Vowel, Rhotic];

macro_rules! descriptor {
    ($phoneme:ident, $key:literal, $ipa:literal, $code:literal, [$($example:literal),*], $categories:expr) => {
        PhonemeDescriptor {
            phoneme: Phoneme::$phoneme,
            key: $key,
            ipa: $ipa,
            code: $code,
            examples: &[$($example),*],
            categories: $categories,
        }
    };
}

/// Descriptor table, in the declaration order of [`Phoneme`].
static DESCRIPTORS: [PhonemeDescriptor; Phoneme::COUNT] = [
    descriptor!(Awe, "awe", "ɑ", 'o', ["c[al]m", "l[o]ng", "c[augh]t", "c[o]t", "[awe]", "th[ough]t"], VOWEL),
    descriptor!(Are, "are", "ɑr", 'A', ["[ar]t", "h[ear]t"], RHOTIC),
    descriptor!(Aa, "aa", "æ", 'a', ["b[a]t", "b[a]n", "m[a]nage"], VOWEL),
    descriptor!(Eye, "eye", "aɪ", '6', ["[i]tem", "b[i]t[e]", "d[ie]", "s[igh]", "s[ig]n", "b[y]"], VOWEL),
    descriptor!(Ire, "ire", "aɪr", 'I', ["h[ire]", "sp[ir]al"], RHOTIC),
    descriptor!(Ao, "ao", "aʊ", '7', ["c[ow]", "ab[ou]t"], VOWEL),
    descriptor!(Our, "our", "aʊr", 'O', ["fl[our]", "fl[ower]"], RHOTIC),
    descriptor!(Eh, "eh", "ɛ", 'e', ["b[e]t", "h[ea]lth"], VOWEL),
    descriptor!(Ey, "ey", "eɪ", '3', ["b[ai]t", "sl[ay]", "th[ey]", "f[a]c[e]", "w[eigh]t", "br[ea]k"], VOWEL),
    descriptor!(Err, "err", "ɛr", 'E', ["[air]", "squ[ear]", "b[ear]", "M[ar]y", "m[arr]y", "m[err]y"], RHOTIC),
    descriptor!(I, "i", "ɪ", 'i', ["b[i]t", "cr[y]stal"], VOWEL),
    descriptor!(Ee, "ee", "iː", '1', ["b[ea]t", "g[ee]k", "br[ie]f", "l[e]gal"], VOWEL),
    descriptor!(Ear, "ear", "ɪr", 'R', ["b[eer]", "n[ear]", "m[irr]or"], RHOTIC),
    descriptor!(Oh, "oh", "oʊ", '5', ["b[oa]t", "al[o]n[e]", "J[oe]", "d[ough]", "l[ow]", "n[o]"], VOWEL),
    descriptor!(Or, "or", "ɔr", '8', ["h[or]s[e]", "h[oar]s[e]", "p[our]"], RHOTIC),
    descriptor!(Oy, "oy", "ɔɪ", '4', ["ch[oi]c[e]", "b[oy]", "s[oi]l"], VOWEL),
    descriptor!(Oo, "oo", "uː", '2', ["y[ou]", "b[oo]t", "g[oo]s[e]"], VOWEL),
    descriptor!(U, "u", "ʊ", 'u', ["b[oo]k", "p[u]ll"], VOWEL),
    descriptor!(Oor, "oor", "ʊr", 'U', ["p[oor]", "t[our]ist", "c[our]ier"], RHOTIC),
    descriptor!(Uh, "uh", "ə", '0', ["b[u]t", "ov[e]n", "[a]bout", "s[o]n", "fl[oo]d", "d[oe]s"], VOWEL),
    descriptor!(Er, "er", "ɜr", '9', ["n[ur]s[e]", "h[urr]y", "f[er]n", "bett[er]", "b[ir]d"], RHOTIC),
    descriptor!(B, "b", "b", 'b', ["[b]it", "e[bb]"], &[Consonant, Voiced, Plosive]),
    descriptor!(Ch, "ch", "tʃ", 'c', ["[ch]urch", "ba[tch]", "na[t]ure", "[c]ello"], &[Consonant, Voiceless, Affricate]),
    descriptor!(D, "d", "d", 'd', ["[d]ye", "la[dd]er", "o[dd]", "rubb[ed]"], &[Consonant, Voiced, Plosive]),
    descriptor!(Dh, "dh", "ð", 'D', ["[th]is", "fa[th]er"], &[Consonant, Voiced, Fricative]),
    descriptor!(F, "f", "f", 'f', ["[f]ight", "cha[ff]", "[ph]one", "lau[gh]"], &[Consonant, Voiceless, Fricative]),
    descriptor!(G, "g", "ɡ", 'g', ["[g]i[g]", "ba[g]", "[gh]ost", "[gu]ess"], &[Consonant, Voiced, Plosive]),
    descriptor!(H, "h", "h", 'h', ["[h]igh", "a[h]ead", "[wh]o"], &[Consonant, Fricative]),
    descriptor!(J, "j", "dʒ", 'j', ["ma[g]ic", "[j]ump", "gra[d]uate", "ba[dg]er", "a[dj]ust"], &[Consonant, Voiced, Affricate]),
    descriptor!(K, "k", "k", 'k', ["[c]at", "[k]ite", "lo[ck]", "[ch]ord"], &[Consonant, Voiceless, Plosive]),
    descriptor!(L, "l", "l", 'l', ["[l]ie", "do[ll]ar", "ba[ll]"], &[Consonant, Liquid, Approximant]),
    descriptor!(M, "m", "m", 'm', ["[m]y", "ca[m]", "ha[mm]er", "cli[mb]"], &[Consonant, Nasal]),
    descriptor!(N, "n", "n", 'n', ["[n]igh", "i[nn]", "[kn]ee", "[gn]ome", "ha[nd]some"], &[Consonant, Nasal]),
    descriptor!(Ng, "ng", "ŋ", 'N', ["ri[ng]", "li[n]k"], &[Consonant, Nasal]),
    descriptor!(P, "p", "p", 'p', ["[p]ie", "a[pp]"], &[Consonant, Voiceless, Plosive]),
    descriptor!(R, "r", "r", 'r', ["[r]ye", "[wr]ong", "[rh]yme"], &[Consonant, Liquid, Approximant]),
    descriptor!(S, "s", "s", 's', ["[s]igh", "me[ss]", "i[c]e", "fla[cc]id", "[sc]ene"], &[Consonant, Voiceless, Fricative]),
    descriptor!(Sh, "sh", "ʃ", 'S', ["[sh]y", "ca[sh]", "emo[ti]on", "o[ce]an"], &[Consonant, Voiceless, Fricative]),
    descriptor!(T, "t", "t", 't', ["[t]en", "wa[t]er", "se[tt]", "dou[bt]", "dress[ed]", "[th]yme"], &[Consonant, Voiceless, Plosive]),
    descriptor!(Th, "th", "θ", 'T', ["[th]igh", "pa[th]"], &[Consonant, Voiceless, Fricative]),
    descriptor!(V, "v", "v", 'v', ["[v]ine", "sa[vv]y", "o[f]", "ha[lve]"], &[Consonant, Voiced, Fricative]),
    descriptor!(W, "w", "w", 'w', ["[w]ine", "s[w]ine", "[wh]at"], &[Consonant, Glide, Approximant]),
    descriptor!(Y, "y", "j", 'y', ["[y]es", "hallelu[j]ah", "h[|]uman"], &[Consonant, Glide, Approximant]),
    descriptor!(Z, "z", "z", 'z', ["[z]oo", "ha[s]", "ro[s]e", "de[ss]ert", "e[|x]am"], &[Consonant, Voiced, Fricative]),
    descriptor!(Zh, "zh", "ʒ", 'Z', ["plea[s]ure", "[g]enre", "bei[ge]", "divi[si]on"], &[Consonant, Voiced, Fricative]),
];

impl Phoneme {
    pub const COUNT: usize = 45;

    pub const ALL: [Phoneme; Phoneme::COUNT] = [
        Phoneme::Awe,
        Phoneme::Are,
        Phoneme::Aa,
        Phoneme::Eye,
        Phoneme::Ire,
        Phoneme::Ao,
        Phoneme::Our,
        Phoneme::Eh,
        Phoneme::Ey,
        Phoneme::Err,
        Phoneme::I,
        Phoneme::Ee,
        Phoneme::Ear,
        Phoneme::Oh,
        Phoneme::Or,
        Phoneme::Oy,
        Phoneme::Oo,
        Phoneme::U,
        Phoneme::Oor,
        Phoneme::Uh,
        Phoneme::Er,
        Phoneme::B,
        Phoneme::Ch,
        Phoneme::D,
        Phoneme::Dh,
        Phoneme::F,
        Phoneme::G,
        Phoneme::H,
        Phoneme::J,
        Phoneme::K,
        Phoneme::L,
        Phoneme::M,
        Phoneme::N,
        Phoneme::Ng,
        Phoneme::P,
        Phoneme::R,
        Phoneme::S,
        Phoneme::Sh,
        Phoneme::T,
        Phoneme::Th,
        Phoneme::V,
        Phoneme::W,
        Phoneme::Y,
        Phoneme::Z,
        Phoneme::Zh,
    ];

    pub fn descriptor(self) -> &'static PhonemeDescriptor {
        &DESCRIPTORS[self as usize]
    }

    pub fn key(self) -> &'static str {
        self.descriptor().key
    }

    pub fn ipa(self) -> &'static str {
        self.descriptor().ipa
    }

    pub fn code(self) -> char {
        self.descriptor().code
    }

    pub fn is_vowel(self) -> bool {
        self.descriptor().has_category(Category::Vowel)
    }

    pub fn is_rhotic(self) -> bool {
        self.descriptor().has_category(Category::Rhotic)
    }

    /// Looks a phoneme up by its key. Keys are case-sensitive and lowercase.
    pub fn from_key(key: &str) -> Option<Phoneme> {
        DESCRIPTORS.iter().find(|d| d.key == key).map(|d| d.phoneme)
    }

    /// Looks a phoneme up by its compact one-character code.
    pub fn from_code(code: char) -> Option<Phoneme> {
        DESCRIPTORS.iter().find(|d| d.code == code).map(|d| d.phoneme)
    }
}

impl fmt::Display for Phoneme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Rows of phonemes as shown on a keyboard/summary board.
pub type Layout = &'static [&'static [Phoneme]];

pub const CONSONANTS_LAYOUT: Layout = &[
    &[Phoneme::B, Phoneme::D, Phoneme::G, Phoneme::F, Phoneme::H, Phoneme::S, Phoneme::Th, Phoneme::Sh, Phoneme::Ch],
    &[Phoneme::P, Phoneme::T, Phoneme::K, Phoneme::V, Phoneme::Z, Phoneme::Dh, Phoneme::Zh, Phoneme::J],
    &[Phoneme::L, Phoneme::R, Phoneme::W, Phoneme::Y, Phoneme::M, Phoneme::N, Phoneme::Ng],
];

pub const VOWELS_LAYOUT: Layout = &[
    &[Phoneme::Are, Phoneme::Err, Phoneme::Ear, Phoneme::Oor, Phoneme::Er, Phoneme::Ire, Phoneme::Or, Phoneme::Our],
    &[Phoneme::Ao, Phoneme::Ey, Phoneme::Ee, Phoneme::Eye, Phoneme::Oh, Phoneme::Oo, Phoneme::Oy],
    &[Phoneme::Aa, Phoneme::Eh, Phoneme::I, Phoneme::Awe, Phoneme::U, Phoneme::Uh],
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn descriptor_table_follows_declaration_order() {
        for phoneme in Phoneme::ALL {
            assert_eq!(phoneme.descriptor().phoneme, phoneme);
        }
    }

    #[test]
    fn keys_and_codes_are_unique() {
        let keys: HashSet<_> = Phoneme::ALL.iter().map(|p| p.key()).collect();
        let codes: HashSet<_> = Phoneme::ALL.iter().map(|p| p.code()).collect();
        assert_eq!(keys.len(), Phoneme::COUNT);
        assert_eq!(codes.len(), Phoneme::COUNT);
        assert!(codes.iter().all(|c| !c.is_whitespace()));
    }

    #[test]
    fn lookup_by_key_and_code() {
        assert_eq!(Phoneme::from_key("awe"), Some(Phoneme::Awe));
        assert_eq!(Phoneme::from_key("zh"), Some(Phoneme::Zh));
        assert_eq!(Phoneme::from_key("aw"), None);
        assert_eq!(Phoneme::from_key("AWE"), None);
        assert_eq!(Phoneme::from_code('N'), Some(Phoneme::Ng));
        assert_eq!(Phoneme::from_code('!'), None);
    }

    #[test]
    fn serde_uses_keys() {
        let json = serde_json::to_string(&Phoneme::Ng).unwrap();
        assert_eq!(json, "\"ng\"");
        let back: Phoneme = serde_json::from_str("\"oor\"").unwrap();
        assert_eq!(back, Phoneme::Oor);
    }

    #[test]
    fn rhotic_vowels_are_vowels() {
        for phoneme in Phoneme::ALL.into_iter().filter(|p| p.is_rhotic()) {
            assert!(phoneme.is_vowel(), "{phoneme} should be a vowel");
        }
        assert!(Phoneme::Er.is_rhotic());
        assert!(!Phoneme::R.is_vowel());
    }

    #[test]
    fn layouts_cover_every_phoneme_once() {
        let mut seen = HashSet::new();
        for row in CONSONANTS_LAYOUT.iter().chain(VOWELS_LAYOUT.iter()) {
            for &phoneme in row.iter() {
                assert!(seen.insert(phoneme), "{phoneme} appears twice");
            }
        }
        assert_eq!(seen.len(), Phoneme::COUNT);
    }
}
