use std::collections::HashSet;

/// Grammatical particles and filler words that never name a place
const STOP_WORDS: &[&str] = &[
    "이", "가", "을", "를", "에", "에서", "으로", "로", "와", "과", "의", "은", "는",
    "혼잡도", "혼잡", "붐빔", "사람", "많이", "적게", "어떻게", "어떤지",
    "알려줘", "알려주세요", "궁금해", "궁금합니다", "보여줘", "보여주세요",
    "찾아줘", "찾아주세요", "검색", "조회", "확인", "체크", "알아보기",
    "정도", "상황", "상태", "현재", "지금", "실시간", "예측", "예상",
];

/// Suffixes that mark a word as a place name (station, park, market, ...)
const LOCATION_SUFFIXES: &[&str] = &[
    "역", "공원", "시장", "거리", "광장", "궁", "동", "구", "로", "길",
];

fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, ',' | '.' | '-' | '·' | '&' | '(' | ')')
}

fn is_hangul(c: char) -> bool {
    ('가'..='힣').contains(&c)
}

fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

fn is_numeric(word: &str) -> bool {
    !word.is_empty() && word.chars().all(|c| c.is_ascii_digit())
}

fn char_len(word: &str) -> usize {
    word.chars().count()
}

/// Extract candidate place tokens from a free-text query.
///
/// Combines four passes over the normalized input: place-suffix capture
/// (compound token plus its stem), separator-split words, contiguous
/// Hangul runs and contiguous Latin runs. Tokens are deduplicated in
/// encounter order; every returned token is at least two characters.
pub fn extract_tokens(query: &str) -> Vec<String> {
    let clean = query.trim().to_lowercase();
    if clean.is_empty() {
        return Vec::new();
    }

    let mut tokens: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let push = |token: &str, tokens: &mut Vec<String>, seen: &mut HashSet<String>| {
        if char_len(token) >= 2 && seen.insert(token.to_string()) {
            tokens.push(token.to_string());
        }
    };

    let segments: Vec<&str> = clean.split(is_separator).filter(|s| !s.is_empty()).collect();

    // 1. place-suffix capture: compound token and its stem
    for segment in &segments {
        for suffix in LOCATION_SUFFIXES {
            if let Some(stem) = segment.strip_suffix(suffix) {
                push(segment, &mut tokens, &mut seen);
                if char_len(stem) >= 2 {
                    push(stem, &mut tokens, &mut seen);
                }
            }
        }
    }

    // 2. separator-split words, minus stop words and bare numbers
    for segment in &segments {
        if !is_stop_word(segment) && !is_numeric(segment) {
            push(segment, &mut tokens, &mut seen);
        }
    }

    // 3. contiguous Hangul runs of two or more characters
    for run in contiguous_runs(&clean, is_hangul) {
        if !is_stop_word(&run) {
            push(&run, &mut tokens, &mut seen);
        }
    }

    // 4. contiguous Latin runs of two or more characters
    for run in contiguous_runs(&clean, |c| c.is_ascii_alphabetic()) {
        push(&run, &mut tokens, &mut seen);
    }

    tokens
}

fn contiguous_runs(input: &str, pred: impl Fn(char) -> bool) -> Vec<String> {
    let mut runs = Vec::new();
    let mut current = String::new();
    for c in input.chars() {
        if pred(c) {
            current.push(c);
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs.retain(|run| char_len(run) >= 2);
    runs
}
