use assessrec::{
    Assessment, HashEmbedder, Recommender,
    embedder::Embedder,
    rules::RuleConfig,
};

fn assessment(
    name: &str,
    description: &str,
    test_type: &[&str],
    duration: Option<u32>,
) -> Assessment {
    Assessment {
        name: name.to_string(),
        description: description.to_string(),
        url: format!(
            "https://example.com/catalog/{}/",
            name.to_lowercase().replace(' ', "-")
        ),
        test_type: test_type.iter().map(|t| t.to_string()).collect(),
        duration,
        adaptive_support: false,
        remote_support: true,
    }
}

fn fixture_catalog() -> Vec<Assessment> {
    vec![
        assessment(
            "Java 8 Programming",
            "Core Java language knowledge for developers",
            &["Knowledge & Skills"],
            Some(18),
        ),
        assessment(
            "Java Enterprise Edition",
            "Server-side Java development with JEE",
            &["Knowledge & Skills"],
            Some(45),
        ),
        assessment(
            "Python Programming",
            "Python language fundamentals and data structures",
            &["Knowledge & Skills"],
            Some(25),
        ),
        assessment(
            "SQL Server Queries",
            "Writing and optimizing SQL queries",
            &["Knowledge & Skills"],
            Some(20),
        ),
        assessment(
            "JavaScript Frontend",
            "JavaScript programming for web frontends",
            &["Knowledge & Skills"],
            Some(22),
        ),
        assessment(
            "Teamwork Styles",
            "Measures collaboration and interpersonal style at work",
            &["Personality & Behaviour"],
            Some(15),
        ),
        assessment(
            "Leadership Judgement",
            "Situational judgement for senior leaders",
            &["Competencies"],
            None,
        ),
        assessment(
            "Verify Numerical Ability",
            "Numerical reasoning under time pressure",
            &["Ability & Aptitude"],
            Some(17),
        ),
    ]
}

fn build_recommender(catalog: Vec<Assessment>) -> Recommender {
    let mut embedder = HashEmbedder::new(256);
    let texts: Vec<String> = catalog.iter().map(|a| a.embedding_text()).collect();
    let rows = embedder.encode(&texts).unwrap();
    Recommender::new(catalog, rows, Box::new(embedder), RuleConfig::default()).unwrap()
}

#[test]
fn returns_at_most_final_k_well_formed_records() {
    let rec = build_recommender(fixture_catalog());
    let result = rec.recommend("Python developer", 40, 3).unwrap();

    assert!(result.recommendations.len() <= 3);
    assert!(!result.recommendations.is_empty());
    for r in &result.recommendations {
        assert!(!r.name.is_empty());
        assert!(r.url.starts_with("https://"));
    }
    assert!(!result.reasoning.is_empty());
}

#[test]
fn repeated_queries_are_deterministic() {
    let rec = build_recommender(fixture_catalog());
    let query = "Looking for a Java developer, collaboration matters, under 40 minutes";

    let first = rec.recommend(query, 40, 5).unwrap();
    let second = rec.recommend(query, 40, 5).unwrap();

    let first_names: Vec<&str> =
        first.recommendations.iter().map(|r| r.name.as_str()).collect();
    let second_names: Vec<&str> =
        second.recommendations.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(first_names, second_names);
    assert_eq!(first.reasoning, second.reasoning);
}

#[test]
fn duration_cap_excludes_long_assessments() {
    let rec = build_recommender(fixture_catalog());
    let result = rec
        .recommend(
            "Need a Java developer with good collaboration skills. \
             Test duration should be less than 30 minutes",
            40,
            5,
        )
        .unwrap();

    assert!(!result.recommendations.is_empty());
    for r in &result.recommendations {
        if let Some(minutes) = r.duration {
            assert!(minutes <= 30, "{} runs {minutes} min", r.name);
        }
    }
    // The 45-minute Java assessment is over the cap regardless of its
    // similarity to the query.
    assert!(
        result
            .recommendations
            .iter()
            .all(|r| r.name != "Java Enterprise Edition")
    );
    assert!(
        result
            .recommendations
            .iter()
            .any(|r| r.name.contains("Java")),
        "expected a Java assessment in {:?}",
        result
            .recommendations
            .iter()
            .map(|r| r.name.as_str())
            .collect::<Vec<_>>()
    );
    assert!(result.reasoning.contains("Filtered"));
}

#[test]
fn multi_skill_query_covers_each_skill() {
    let rec = build_recommender(fixture_catalog());
    let result = rec
        .recommend(
            "Looking to hire professionals who are proficient in \
             Python, SQL and JavaScript",
            40,
            6,
        )
        .unwrap();

    let names: Vec<&str> = result
        .recommendations
        .iter()
        .map(|r| r.name.as_str())
        .collect();
    assert!(names.iter().any(|n| n.contains("Python")), "{names:?}");
    assert!(names.iter().any(|n| n.contains("SQL")), "{names:?}");
    assert!(names.iter().any(|n| n.contains("JavaScript")), "{names:?}");
}

#[test]
fn soft_skill_query_surfaces_behavioural_assessment() {
    let rec = build_recommender(fixture_catalog());
    let result = rec
        .recommend(
            "We value teamwork and collaboration above everything",
            40,
            5,
        )
        .unwrap();

    let names: Vec<&str> = result
        .recommendations
        .iter()
        .map(|r| r.name.as_str())
        .collect();
    assert!(names.contains(&"Teamwork Styles"), "{names:?}");
}

#[test]
fn results_never_repeat_an_assessment() {
    let rec = build_recommender(fixture_catalog());
    let result = rec
        .recommend("Java and Python and SQL and JavaScript developer", 40, 8)
        .unwrap();

    let mut names: Vec<&str> = result
        .recommendations
        .iter()
        .map(|r| r.name.as_str())
        .collect();
    let before = names.len();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), before);
}

#[test]
fn unknown_duration_survives_a_duration_cap() {
    let rec = build_recommender(fixture_catalog());
    let result = rec
        .recommend(
            "Senior leadership judgement assessment, max 20 minutes",
            40,
            8,
        )
        .unwrap();

    // The catalog entry without a listed duration is retrievable; only
    // entries known to exceed the cap are dropped.
    for r in &result.recommendations {
        if let Some(minutes) = r.duration {
            assert!(minutes <= 20);
        }
    }
}

#[test]
fn impossible_duration_cap_yields_empty_result() {
    let catalog = vec![
        assessment("Java 8 Programming", "Core Java", &["Knowledge & Skills"], Some(18)),
        assessment("Python Programming", "Python basics", &["Knowledge & Skills"], Some(25)),
    ];
    let rec = build_recommender(catalog);
    let result = rec
        .recommend("Java or Python developer, under 5 minutes", 40, 5)
        .unwrap();

    assert!(result.recommendations.is_empty());
    assert!(result.reasoning.contains("No candidates survived"));
}
