// ==========================================
// 物料目录导入 - 端到端集成测试
// ==========================================
// 覆盖: 冲突检测与人工覆写、幂等、默认项互斥、单行失败隔离、
//       自动/交互/直接策略、进度回调、终止性错误
// ==========================================


use materials_catalog::domain::{
    ImportOutcome, ImportStats, OperatorDecision, OverrideMap, ResolutionOverride, RowOutcome,
    SkipReason, TaxonomyChoice,
};
use materials_catalog::importer::{CatalogImporter, ImportError, NoOpProgressSink};
use materials_catalog::repository::{CatalogStore, SqliteCatalogStore};
use materials_catalog::{IdentityKey, ResolutionStrategy, TaxonomyKind};
use tempfile::NamedTempFile;
use test_helpers::{
    create_test_db, material, seed_taxonomy, write_csv, MockConfigReader, RecordingProgress,
    ScriptedResolver, SeededTaxonomy, HEADER,
};

type TestImporter = CatalogImporter<SqliteCatalogStore, MockConfigReader>;

async fn setup() -> (NamedTempFile, String, SqliteCatalogStore, SeededTaxonomy) {
    let (temp_file, db_path) = create_test_db().unwrap();
    let store = SqliteCatalogStore::new(&db_path).unwrap();
    let taxonomy = seed_taxonomy(&store).await;
    (temp_file, db_path, store, taxonomy)
}

fn importer(db_path: &str, config: MockConfigReader) -> TestImporter {
    CatalogImporter::new(SqliteCatalogStore::new(db_path).unwrap(), config)
}

fn completed(outcome: ImportOutcome) -> materials_catalog::ImportReport {
    match outcome {
        ImportOutcome::Completed(report) => report,
        ImportOutcome::Cancelled { strategy } => panic!("导入被取消: {:?}", strategy),
    }
}

// ==========================================
// 冲突检测与人工覆写
// ==========================================

#[tokio::test]
async fn test_category_conflict_override_keeps_current_category() {
    let (_temp, db_path, store, tax) = setup().await;
    let tomato_id = store
        .insert(material("Tomato", None, &tax.veg, &tax.supplier_a, &tax.gr, true))
        .await
        .unwrap();

    let csv = write_csv(&[HEADER, "Tomato,,Fruit,A,kg,1,5000"]);
    let resolver =
        ScriptedResolver::with_category("Tomato", TaxonomyChoice::Existing(tax.veg.clone()));

    let outcome = importer(&db_path, MockConfigReader::default())
        .run(csv.path(), &resolver, &NoOpProgressSink)
        .await
        .unwrap();
    let report = completed(outcome);

    assert_eq!(report.strategy, ResolutionStrategy::Interactive);
    assert_eq!(report.conflicts, 1);
    {
        let requests = resolver.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let conflict = &requests[0].conflicts[0];
        assert_eq!(conflict.current_record_id, tomato_id);
        assert_eq!(conflict.current_category_name.as_deref(), Some("Veg"));
        assert_eq!(conflict.csv_category_name.as_deref(), Some("Fruit"));
        assert!(conflict.category_changed);
        assert!(!conflict.supplier_changed);
        assert!(requests[0].new_values.is_empty());
    }

    assert_eq!(
        report.stats,
        ImportStats {
            inserted: 0,
            updated: 0,
            skipped: 1
        }
    );
    assert_eq!(
        report.rows[0].outcome,
        RowOutcome::Skipped {
            reason: SkipReason::Unchanged
        }
    );

    let record = store.find_by_id(&tomato_id).unwrap().unwrap();
    assert_eq!(record.category_id.as_deref(), Some(tax.veg.as_str()));
}

#[tokio::test]
async fn test_category_conflict_override_applies_new_category() {
    let (_temp, db_path, store, tax) = setup().await;
    let tomato_id = store
        .insert(material("Tomato", None, &tax.veg, &tax.supplier_a, &tax.gr, true))
        .await
        .unwrap();

    let csv = write_csv(&[HEADER, "Tomato,,Fruit,A,kg,1,5000"]);
    let resolver =
        ScriptedResolver::with_category("Tomato", TaxonomyChoice::Existing(tax.fruit.clone()));

    let report = completed(
        importer(&db_path, MockConfigReader::default())
            .run(csv.path(), &resolver, &NoOpProgressSink)
            .await
            .unwrap(),
    );

    assert_eq!(report.stats.updated, 1);
    assert_eq!(
        report.rows[0].outcome,
        RowOutcome::Updated {
            id: tomato_id.clone()
        }
    );

    let record = store.find_by_id(&tomato_id).unwrap().unwrap();
    assert_eq!(record.category_id.as_deref(), Some(tax.fruit.as_str()));
    assert_eq!(record.supplier_id.as_deref(), Some(tax.supplier_a.as_str()));
    assert!(record.last_update.is_some());
}

#[tokio::test]
async fn test_create_new_override_creates_category_before_execution() {
    let (_temp, db_path, store, tax) = setup().await;
    let tomato_id = store
        .insert(material("Tomato", None, &tax.veg, &tax.supplier_a, &tax.gr, true))
        .await
        .unwrap();

    let csv = write_csv(&[HEADER, "Tomato,,Fruit,A,kg,1,5000"]);
    let resolver =
        ScriptedResolver::with_category("Tomato", TaxonomyChoice::CreateNew("Herbs".to_string()));

    let report = completed(
        importer(&db_path, MockConfigReader::default())
            .run(csv.path(), &resolver, &NoOpProgressSink)
            .await
            .unwrap(),
    );

    assert_eq!(report.created.categories.len(), 1);
    let herbs = &report.created.categories[0];
    assert_eq!(herbs.name, "Herbs");

    let record = store.find_by_id(&tomato_id).unwrap().unwrap();
    assert_eq!(record.category_id.as_deref(), Some(herbs.id.as_str()));

    let categories = store.list_taxonomy(TaxonomyKind::Category).await.unwrap();
    assert_eq!(categories.len(), 3);
}

#[tokio::test]
async fn test_clear_override_empties_supplier() {
    let (_temp, db_path, store, tax) = setup().await;
    let tomato_id = store
        .insert(material("Tomato", None, &tax.veg, &tax.supplier_a, &tax.gr, true))
        .await
        .unwrap();

    let mut overrides = OverrideMap::new();
    overrides.insert(
        IdentityKey::new("Tomato", None),
        ResolutionOverride {
            category: None,
            supplier: Some(TaxonomyChoice::Clear),
        },
    );
    let resolver = ScriptedResolver::new(OperatorDecision::Confirmed {
        overrides,
        approved_new_values: Default::default(),
    });

    let csv = write_csv(&[HEADER, "Tomato,,Fruit,A,kg,1,5000"]);
    let report = completed(
        importer(&db_path, MockConfigReader::default())
            .run(csv.path(), &resolver, &NoOpProgressSink)
            .await
            .unwrap(),
    );

    assert_eq!(report.stats.updated, 1);
    let record = store.find_by_id(&tomato_id).unwrap().unwrap();
    assert_eq!(record.supplier_id, None);
    assert_eq!(record.category_id.as_deref(), Some(tax.fruit.as_str()));
}

#[tokio::test]
async fn test_existing_pairs_raise_no_conflict() {
    let (_temp, db_path, store, tax) = setup().await;
    let tomato_a = store
        .insert(material("Tomato", None, &tax.veg, &tax.supplier_a, &tax.gr, true))
        .await
        .unwrap();
    let tomato_b = store
        .insert(material("Tomato", None, &tax.fruit, &tax.supplier_b, &tax.gr, false))
        .await
        .unwrap();

    let csv = write_csv(&[
        HEADER,
        "Tomato,,Veg,A,kg,1,5000",
        "Tomato,,Fruit,B,kg,1,5200",
    ]);
    let importer = importer(&db_path, MockConfigReader::default());

    let plan = importer.prepare(csv.path()).await.unwrap();
    assert!(plan.conflicts.conflicts.is_empty());
    assert_eq!(plan.strategy, ResolutionStrategy::Direct);
    assert_eq!(plan.matched_rows, 2);
    assert_eq!(plan.new_rows(), 0);

    let resolver = ScriptedResolver::accept_all();
    let report = completed(
        importer
            .run(csv.path(), &resolver, &NoOpProgressSink)
            .await
            .unwrap(),
    );
    assert_eq!(resolver.request_count(), 0);

    // 每行只更新各自供应商下的记录
    assert_eq!(report.stats.updated, 1);
    assert_eq!(report.stats.skipped, 1);
    assert_eq!(
        report.rows[1].outcome,
        RowOutcome::Updated {
            id: tomato_b.clone()
        }
    );
    assert_eq!(
        store.find_by_id(&tomato_b).unwrap().unwrap().package_price,
        5200.0
    );
    assert_eq!(
        store.find_by_id(&tomato_a).unwrap().unwrap().package_price,
        5000.0
    );
}

#[tokio::test]
async fn test_unknown_pair_conflicts_against_supplier_match() {
    let (_temp, db_path, store, tax) = setup().await;
    store
        .insert(material("Tomato", None, &tax.veg, &tax.supplier_a, &tax.gr, true))
        .await
        .unwrap();
    let tomato_b = store
        .insert(material("Tomato", None, &tax.fruit, &tax.supplier_b, &tax.gr, false))
        .await
        .unwrap();

    let csv = write_csv(&[HEADER, "Tomato,,Veg,B,kg,1,5000"]);
    let plan = importer(&db_path, MockConfigReader::default())
        .prepare(csv.path())
        .await
        .unwrap();

    assert_eq!(plan.strategy, ResolutionStrategy::Interactive);
    assert_eq!(plan.conflicts.conflicts.len(), 1);
    let conflict = &plan.conflicts.conflicts[0];
    assert_eq!(conflict.current_record_id, tomato_b);
    assert!(conflict.category_changed);
    assert!(!conflict.supplier_changed);
}

#[tokio::test]
async fn test_soft_deleted_records_are_not_matched() {
    let (_temp, db_path, store, tax) = setup().await;
    let old_id = store
        .insert(material("Tomato", None, &tax.veg, &tax.supplier_a, &tax.gr, true))
        .await
        .unwrap();
    store.soft_delete(&old_id).unwrap();

    let csv = write_csv(&[HEADER, "Tomato,,Fruit,A,kg,1,5000"]);
    let resolver = ScriptedResolver::accept_all();
    let report = completed(
        importer(&db_path, MockConfigReader::default())
            .run(csv.path(), &resolver, &NoOpProgressSink)
            .await
            .unwrap(),
    );

    assert_eq!(report.strategy, ResolutionStrategy::Direct);
    assert_eq!(report.stats.inserted, 1);

    let live = store.list_by_name("Tomato").unwrap();
    assert_eq!(live.len(), 1);
    assert_ne!(live[0].id, old_id);
    assert!(live[0].is_default);
}

// ==========================================
// 幂等与默认项
// ==========================================

#[tokio::test]
async fn test_second_import_of_same_file_changes_nothing() {
    let (_temp, db_path, store, _tax) = setup().await;

    let csv = write_csv(&[
        HEADER,
        "Tomato,,Veg,A,kg,2,9000",
        "Milk,Alpina,Dairy,B,l,1,4200",
        "Egg,,Veg,B,unidad,30,15000",
    ]);

    let first = completed(
        importer(&db_path, MockConfigReader::automatic())
            .run(csv.path(), &ScriptedResolver::accept_all(), &NoOpProgressSink)
            .await
            .unwrap(),
    );
    assert_eq!(first.strategy, ResolutionStrategy::Automatic);
    assert_eq!(first.stats.inserted, 3);
    assert_eq!(first.created.categories.len(), 1);
    assert_eq!(first.created.categories[0].name, "Dairy");

    let tomato = &store.list_by_name("Tomato").unwrap()[0];
    assert_eq!(tomato.packaging_size, 2000.0);
    assert_eq!(tomato.unit_cost, Some(4.5));

    let second = completed(
        importer(&db_path, MockConfigReader::automatic())
            .run(csv.path(), &ScriptedResolver::accept_all(), &NoOpProgressSink)
            .await
            .unwrap(),
    );
    assert_eq!(second.strategy, ResolutionStrategy::Direct);
    assert_eq!(second.stats.inserted, 0);
    assert_eq!(second.stats.updated, 0);
    assert_eq!(second.stats.skipped, 3);
    assert_eq!(second.skip_breakdown().unchanged, 3);
    assert_eq!(store.list_all().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_same_material_from_two_suppliers_stays_two_records() {
    let (_temp, db_path, store, tax) = setup().await;

    let csv = write_csv(&[
        HEADER,
        "Tomato,,Veg,A,kg,1,5000",
        "Tomato,,Veg,B,kg,1,6000",
    ]);

    let first = completed(
        importer(&db_path, MockConfigReader::automatic())
            .run(csv.path(), &ScriptedResolver::accept_all(), &NoOpProgressSink)
            .await
            .unwrap(),
    );
    assert_eq!(
        first.stats,
        ImportStats {
            inserted: 2,
            updated: 0,
            skipped: 0
        }
    );

    let tomatoes = store.list_by_name("Tomato").unwrap();
    assert_eq!(tomatoes.len(), 2);
    let from_a = tomatoes
        .iter()
        .find(|r| r.supplier_id.as_deref() == Some(tax.supplier_a.as_str()))
        .unwrap();
    let from_b = tomatoes
        .iter()
        .find(|r| r.supplier_id.as_deref() == Some(tax.supplier_b.as_str()))
        .unwrap();
    assert_eq!(from_a.package_price, 5000.0);
    assert_eq!(from_b.package_price, 6000.0);
    assert!(from_a.is_default);
    assert!(!from_b.is_default);

    let second = completed(
        importer(&db_path, MockConfigReader::automatic())
            .run(csv.path(), &ScriptedResolver::accept_all(), &NoOpProgressSink)
            .await
            .unwrap(),
    );
    assert_eq!(
        second.stats,
        ImportStats {
            inserted: 0,
            updated: 0,
            skipped: 2
        }
    );
    assert_eq!(second.skip_breakdown().unchanged, 2);
    assert_eq!(store.list_by_name("Tomato").unwrap().len(), 2);
}

#[tokio::test]
async fn test_default_flag_is_exclusive_per_name() {
    let (_temp, db_path, store, tax) = setup().await;
    let diana = store
        .insert(material("Rice", Some("Diana"), &tax.veg, &tax.supplier_a, &tax.gr, true))
        .await
        .unwrap();
    let roa = store
        .insert(material("Rice", Some("Roa"), &tax.veg, &tax.supplier_b, &tax.gr, false))
        .await
        .unwrap();

    let csv = write_csv(&[
        "Name,Brand,Category,Supplier,Unit,Qty,Price,Default",
        "Rice,Roa,Veg,B,kg,1,5000,yes",
        "Rice,Florhuila,Veg,A,kg,1,4800,",
    ]);
    let report = completed(
        importer(&db_path, MockConfigReader::default())
            .run(csv.path(), &ScriptedResolver::accept_all(), &NoOpProgressSink)
            .await
            .unwrap(),
    );
    assert_eq!(report.stats.updated, 1);
    assert_eq!(report.stats.inserted, 1);

    let rice = store.list_by_name("Rice").unwrap();
    assert_eq!(rice.len(), 3);
    let defaults: Vec<_> = rice.iter().filter(|r| r.is_default).collect();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0].id, roa);
    assert!(!store.find_by_id(&diana).unwrap().unwrap().is_default);
}

#[tokio::test]
async fn test_default_flag_left_alone_when_exclusivity_disabled() {
    let (_temp, db_path, store, tax) = setup().await;
    store
        .insert(material("Rice", Some("Diana"), &tax.veg, &tax.supplier_a, &tax.gr, true))
        .await
        .unwrap();

    let csv = write_csv(&[
        "Name,Brand,Category,Supplier,Unit,Qty,Price,Default",
        "Rice,Roa,Veg,B,kg,1,5000,yes",
    ]);
    let config = MockConfigReader {
        exclusive_default: false,
        ..Default::default()
    };
    completed(
        importer(&db_path, config)
            .run(csv.path(), &ScriptedResolver::accept_all(), &NoOpProgressSink)
            .await
            .unwrap(),
    );

    let defaults = store
        .list_by_name("Rice")
        .unwrap()
        .into_iter()
        .filter(|r| r.is_default)
        .count();
    assert_eq!(defaults, 2);
}

// ==========================================
// 单行失败隔离
// ==========================================

#[tokio::test]
async fn test_invalid_row_does_not_stop_the_run() {
    let (_temp, db_path, store, _tax) = setup().await;

    let csv = write_csv(&[
        HEADER,
        "Tomato,,Veg,A,kg,1,5000",
        "Onion,,Veg,A,kg,1,3000",
        "Garlic,,Veg,,kg,1,8000",
        "Apple,,Fruit,B,kg,1,6000",
        "Pear,,Fruit,B,kg,0,6000",
    ]);
    let report = completed(
        importer(&db_path, MockConfigReader::default())
            .run(csv.path(), &ScriptedResolver::accept_all(), &NoOpProgressSink)
            .await
            .unwrap(),
    );

    assert_eq!(report.stats.inserted, 3);
    assert_eq!(report.stats.skipped, 2);
    assert_eq!(report.stats.total(), 5);

    let garlic = report.rows.iter().find(|r| r.row_number == 4).unwrap();
    assert_eq!(
        garlic.outcome,
        RowOutcome::Skipped {
            reason: SkipReason::UnresolvedSupplier
        }
    );
    let pear = report.rows.iter().find(|r| r.row_number == 6).unwrap();
    assert_eq!(
        pear.outcome,
        RowOutcome::Skipped {
            reason: SkipReason::InvalidQuantity
        }
    );
    assert_eq!(report.skip_breakdown().invalid, 2);

    assert!(store.list_by_name("Garlic").unwrap().is_empty());
    assert_eq!(store.list_by_name("Apple").unwrap().len(), 1);
}

#[tokio::test]
async fn test_blank_taxonomy_keeps_current_value_on_update() {
    let (_temp, db_path, store, tax) = setup().await;
    let tomato_id = store
        .insert(material("Tomato", None, &tax.veg, &tax.supplier_a, &tax.gr, true))
        .await
        .unwrap();

    let csv = write_csv(&[HEADER, "Tomato,,,,kg,1,5500"]);
    let report = completed(
        importer(&db_path, MockConfigReader::default())
            .run(csv.path(), &ScriptedResolver::accept_all(), &NoOpProgressSink)
            .await
            .unwrap(),
    );

    assert_eq!(report.stats.updated, 1);
    let record = store.find_by_id(&tomato_id).unwrap().unwrap();
    assert_eq!(record.category_id.as_deref(), Some(tax.veg.as_str()));
    assert_eq!(record.supplier_id.as_deref(), Some(tax.supplier_a.as_str()));
    assert_eq!(record.package_price, 5500.0);
}

// ==========================================
// 策略
// ==========================================

#[tokio::test]
async fn test_automatic_strategy_creates_new_taxonomy() {
    let (_temp, db_path, store, _tax) = setup().await;

    let csv = write_csv(&[HEADER, "Basil,,Herbs,Acme,gr,250,3000"]);
    let resolver = ScriptedResolver::accept_all();
    let report = completed(
        importer(&db_path, MockConfigReader::automatic())
            .run(csv.path(), &resolver, &NoOpProgressSink)
            .await
            .unwrap(),
    );

    assert_eq!(report.strategy, ResolutionStrategy::Automatic);
    assert_eq!(resolver.request_count(), 0);
    assert_eq!(report.created.categories.len(), 1);
    assert_eq!(report.created.suppliers.len(), 1);
    assert_eq!(report.stats.inserted, 1);

    let basil = &store.list_by_name("Basil").unwrap()[0];
    assert_eq!(
        basil.category_id.as_deref(),
        Some(report.created.categories[0].id.as_str())
    );
    assert_eq!(
        basil.supplier_id.as_deref(),
        Some(report.created.suppliers[0].id.as_str())
    );
}

#[tokio::test]
async fn test_unapproved_new_values_skip_their_rows() {
    let (_temp, db_path, store, _tax) = setup().await;

    let csv = write_csv(&[HEADER, "Basil,,Herbs,A,gr,250,3000", "Onion,,Veg,A,kg,1,3000"]);
    let resolver = ScriptedResolver::accept_all();
    let report = completed(
        importer(&db_path, MockConfigReader::default())
            .run(csv.path(), &resolver, &NoOpProgressSink)
            .await
            .unwrap(),
    );

    assert_eq!(report.strategy, ResolutionStrategy::Interactive);
    assert_eq!(resolver.request_count(), 1);
    assert!(report.created.categories.is_empty());
    assert_eq!(report.stats.inserted, 1);
    assert!(report.skip_reasons().contains(&SkipReason::UnresolvedCategory));
    assert!(store.list_by_name("Basil").unwrap().is_empty());
}

#[tokio::test]
async fn test_interactive_cancel_writes_nothing() {
    let (_temp, db_path, store, tax) = setup().await;
    let tomato_id = store
        .insert(material("Tomato", None, &tax.veg, &tax.supplier_a, &tax.gr, true))
        .await
        .unwrap();

    let csv = write_csv(&[HEADER, "Tomato,,Fruit,A,kg,1,9999", "Basil,,Herbs,A,gr,250,3000"]);
    let resolver = ScriptedResolver::new(OperatorDecision::Cancelled);
    let outcome = importer(&db_path, MockConfigReader::default())
        .run(csv.path(), &resolver, &NoOpProgressSink)
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        ImportOutcome::Cancelled {
            strategy: ResolutionStrategy::Interactive
        }
    ));
    assert_eq!(store.list_all().await.unwrap().len(), 1);
    assert_eq!(
        store.find_by_id(&tomato_id).unwrap().unwrap().package_price,
        5000.0
    );
    assert_eq!(
        store.list_taxonomy(TaxonomyKind::Category).await.unwrap().len(),
        2
    );
}

#[tokio::test]
async fn test_direct_import_confirmation() {
    let (_temp, db_path, store, _tax) = setup().await;
    let csv = write_csv(&[HEADER, "Onion,,Veg,A,kg,1,3000"]);
    let config = MockConfigReader {
        confirm_direct_import: true,
        ..Default::default()
    };

    let declining = ScriptedResolver::declining();
    let outcome = importer(&db_path, config)
        .run(csv.path(), &declining, &NoOpProgressSink)
        .await
        .unwrap();
    assert!(matches!(outcome, ImportOutcome::Cancelled { .. }));
    {
        let confirmations = declining.confirmations.lock().unwrap();
        assert_eq!(confirmations.len(), 1);
        assert_eq!(confirmations[0].total_rows, 1);
        assert_eq!(confirmations[0].new_rows, 1);
    }
    assert!(store.list_all().await.unwrap().is_empty());

    let accepting = ScriptedResolver::accept_all();
    let report = completed(
        importer(&db_path, config)
            .run(csv.path(), &accepting, &NoOpProgressSink)
            .await
            .unwrap(),
    );
    assert_eq!(report.stats.inserted, 1);
}

// ==========================================
// 进度与终止性错误
// ==========================================

#[tokio::test]
async fn test_progress_is_monotonic_and_ends_at_100() {
    let (_temp, db_path, _store, _tax) = setup().await;
    let csv = write_csv(&[
        HEADER,
        "Tomato,,Veg,A,kg,1,5000",
        "Onion,,Veg,A,kg,1,3000",
        "Apple,,Fruit,B,kg,1,6000",
    ]);

    let progress = RecordingProgress::default();
    completed(
        importer(&db_path, MockConfigReader::default())
            .run(csv.path(), &ScriptedResolver::accept_all(), &progress)
            .await
            .unwrap(),
    );

    let values = progress.values.lock().unwrap();
    assert_eq!(values.len(), 3);
    assert!(values.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(*values.last().unwrap(), 100);
}

#[tokio::test]
async fn test_header_only_file_is_malformed() {
    let (_temp, db_path, _store, _tax) = setup().await;
    let csv = write_csv(&[HEADER]);

    let err = importer(&db_path, MockConfigReader::default())
        .run(csv.path(), &ScriptedResolver::accept_all(), &NoOpProgressSink)
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::MalformedInput(_)));
}

#[tokio::test]
async fn test_rows_without_identity_are_discarded() {
    let (_temp, db_path, _store, _tax) = setup().await;
    let csv = write_csv(&[HEADER, ",,,,kg,1,5000", "Onion,,Veg,A,kg,1,3000"]);

    let plan = importer(&db_path, MockConfigReader::default())
        .prepare(csv.path())
        .await
        .unwrap();
    assert_eq!(plan.rows.len(), 1);
    assert_eq!(plan.discarded_rows, 1);

    let only_blank = write_csv(&[HEADER, ",,,,kg,1,5000"]);
    let err = importer(&db_path, MockConfigReader::default())
        .prepare(only_blank.path())
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::MalformedInput(_)));
}

#[tokio::test]
async fn test_missing_canonical_units_aborts() {
    let (_temp, db_path) = create_test_db().unwrap();
    let store = SqliteCatalogStore::new(&db_path).unwrap();
    store
        .create_taxonomy(TaxonomyKind::Category, vec!["Veg".to_string()])
        .await
        .unwrap();
    store
        .create_taxonomy(TaxonomyKind::Supplier, vec!["A".to_string()])
        .await
        .unwrap();
    store
        .create_taxonomy(TaxonomyKind::Uom, vec!["kilo".to_string()])
        .await
        .unwrap();

    let csv = write_csv(&[HEADER, "Onion,,Veg,A,kg,1,3000"]);
    let err = importer(&db_path, MockConfigReader::default())
        .run(csv.path(), &ScriptedResolver::accept_all(), &NoOpProgressSink)
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::CanonicalUnitsMissing));
    assert!(store.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unsupported_extension_is_rejected() {
    let (_temp, db_path, _store, _tax) = setup().await;
    let txt = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();

    let err = importer(&db_path, MockConfigReader::default())
        .prepare(txt.path())
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::UnsupportedFormat(_)));
}
