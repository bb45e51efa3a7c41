use hashdex_core::tokenizer::Tokenizer;
use hashdex_core::TokenizerConfig;

#[test]
fn it_normalizes_and_stems() {
    let tokenizer = Tokenizer::new(TokenizerConfig { stem: true, remove_stopwords: false });
    let toks = tokenizer.tokenize("Running Runners RUN! The café's menu.");
    let words: Vec<String> = toks.into_iter().map(|(w, _)| w).collect();
    // Stemming to "run" should appear
    assert!(words.contains(&"run".to_string()));
    assert!(words.contains(&"menu".to_string()));
}

#[test]
fn it_filters_stopwords_but_keeps_positions() {
    let tokenizer = Tokenizer::new(TokenizerConfig { stem: false, remove_stopwords: true });
    let toks = tokenizer.tokenize("The quick brown fox and the lazy dog");
    let words: Vec<&str> = toks.iter().map(|(w, _)| w.as_str()).collect();
    assert!(!words.contains(&"the"));
    assert!(!words.contains(&"and"));
    assert_eq!(toks.last(), Some(&("dog".to_string(), 7)));
}

#[test]
fn default_keeps_every_word() {
    let toks = Tokenizer::default().tokenize("The THE the; café");
    let words: Vec<&str> = toks.iter().map(|(w, _)| w.as_str()).collect();
    assert_eq!(words, vec!["the", "the", "the", "café"]);
}
