/*!
 * Integration tests for language and score imports through the controller
 */

use anyhow::Result;

use recimport::database::models::LanguagePair;
use recimport::{Controller, ImportError, ImportRequest, LoadMode};
use crate::common;

/// Test that three codes become three language rows
#[test]
fn test_loadLanguages_withThreeCodes_shouldCreateThreeRows() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = common::test_config(temp_dir.path());
    let langs = common::create_languages_tsv(temp_dir.path())?;

    let mut controller = Controller::with_config(config.clone())?;
    let summary = controller.run(&ImportRequest::Languages { tsv: langs })?;
    controller.close()?;

    assert_eq!(summary.rows_inserted, 3);
    assert_eq!(summary.table, "language");

    let repo = common::open_repository(&config)?;
    let languages = repo.list_languages()?;
    assert_eq!(
        languages.iter().map(|l| l.code.as_str()).collect::<Vec<_>>(),
        vec!["en", "fr", "de"]
    );
    assert!(languages.iter().all(|l| l.id > 0));

    Ok(())
}

/// Test that a header plus two rows for en -> fr become two recommendations
#[test]
fn test_loadScores_withHeaderAndTwoRows_shouldCreateTwoRecommendations() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = common::test_config(temp_dir.path());
    let langs = common::create_languages_tsv(temp_dir.path())?;
    let scores = common::create_scores_tsv(temp_dir.path())?;

    let mut controller = Controller::with_config(config.clone())?;
    controller.run(&ImportRequest::Languages { tsv: langs })?;

    let request = ImportRequest::new(
        LoadMode::Scores,
        Some("en".to_string()),
        Some("fr".to_string()),
        Some(scores),
    )?;
    let summary = controller.run(&request)?;
    controller.close()?;

    assert_eq!(summary.rows_inserted, 2);

    let repo = common::open_repository(&config)?;
    let pair = repo.resolve_language_pair("en", "fr")?;
    assert_eq!(
        pair,
        LanguagePair {
            source_id: 1,
            target_id: 2
        }
    );

    let rows = repo.recommendations_for_pair(pair)?;
    assert_eq!(rows.len(), 2);
    assert_eq!((rows[0].wikidata_id.as_str(), rows[0].source_id, rows[0].target_id), ("Q1", 1, 2));
    assert!((rows[0].score - 0.9).abs() < f64::EPSILON);
    assert_eq!((rows[1].wikidata_id.as_str(), rows[1].source_id, rows[1].target_id), ("Q2", 1, 2));
    assert!((rows[1].score - 0.5).abs() < f64::EPSILON);

    Ok(())
}

/// Test that an unknown language aborts the load before any row is written
#[test]
fn test_loadScores_withUnknownLanguage_shouldInsertNothing() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = common::test_config(temp_dir.path());
    let langs = common::create_languages_tsv(temp_dir.path())?;
    let scores = common::create_scores_tsv(temp_dir.path())?;

    let mut controller = Controller::with_config(config.clone())?;
    controller.load_languages(&langs)?;

    let err = controller.load_scores(&scores, "xx", "fr").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ImportError>(),
        Some(ImportError::UnknownLanguages(codes)) if codes == &vec!["xx".to_string()]
    ));
    drop(controller);

    let stats = common::open_repository(&config)?.stats()?;
    assert_eq!(stats.recommendation_count, 0);

    Ok(())
}

/// Test that a malformed row rolls back the whole batch
#[test]
fn test_loadScores_withMalformedRow_shouldRollBackBatch() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = common::test_config(temp_dir.path());
    let langs = common::create_languages_tsv(temp_dir.path())?;
    let scores = common::create_test_file(
        temp_dir.path(),
        "bad.tsv",
        "wikidata_id\tprediction\nQ1\t0.9\nQ2\n",
    )?;

    let mut controller = Controller::with_config(config)?;
    controller.load_languages(&langs)?;

    let err = controller.load_scores(&scores, "en", "fr").unwrap_err();
    assert!(err.to_string().contains("line 3"));
    assert_eq!(controller.stats()?.recommendation_count, 0);

    Ok(())
}

/// Test that a missing input file is reported as such
#[test]
fn test_loadLanguages_withMissingFile_shouldReturnInputFileError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mut controller = Controller::with_config(common::test_config(temp_dir.path()))?;

    let err = controller
        .load_languages(&temp_dir.path().join("absent.tsv"))
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ImportError>(),
        Some(ImportError::InputFile { .. })
    ));
    Ok(())
}

/// Test that repeated score loads append and top results follow score order
#[test]
fn test_topScores_afterTwoLoads_shouldRankAcrossBatches() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let langs = common::create_languages_tsv(temp_dir.path())?;
    let first = common::create_test_file(temp_dir.path(), "a.tsv", "h\nQ1\t0.3\nQ2\t0.7\n")?;
    let second = common::create_test_file(temp_dir.path(), "b.tsv", "h\nQ3\t0.5\n")?;

    let mut controller = Controller::new_for_test()?;
    controller.load_languages(&langs)?;
    controller.load_scores(&first, "en", "de")?;
    controller.load_scores(&second, "fr", "de")?;

    let ids: Vec<String> = ["Q1", "Q2", "Q3"].iter().map(|s| s.to_string()).collect();
    let top = controller.top_scores("de", &ids, 2)?;

    assert_eq!(
        top.iter().map(|a| a.wikidata_id.as_str()).collect::<Vec<_>>(),
        vec!["Q2", "Q3"]
    );
    assert!(controller.top_scores("fr", &ids, 10)?.is_empty());

    Ok(())
}

/// Test that custom table names flow from configuration to the loads
#[test]
fn test_withConfig_customTableNames_shouldLoadIntoThem() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mut config = common::test_config(temp_dir.path());
    config.database.language_table = "lang".to_string();
    config.database.recommendation_table = "rec".to_string();
    let langs = common::create_languages_tsv(temp_dir.path())?;

    let mut controller = Controller::with_config(config)?;
    let summary = controller.load_languages(&langs)?;

    assert_eq!(summary.table, "lang");
    assert_eq!(controller.stats()?.language_count, 3);
    Ok(())
}
