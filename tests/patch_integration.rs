use std::collections::BTreeMap;
use std::sync::Arc;

use aspect_patch::{
    generate_id, make_dataset_urn, make_tag_urn, make_term_urn, make_user_urn, Aspect,
    AspectName, AspectStore, AuditStamp, CatalogClient, CatalogError, ChangeProposal, ChartInfo,
    DashboardInfo, DataJobInfo, DatasetProperties, EntityUrn, GlobalTags,
    GlossaryTermAssociation, GlossaryTerms, InMemoryAspectStore, Owner, Ownership,
    OwnershipType, PatchBuilder, TagAssociation,
};
use tokio::net::TcpListener;

// Starts the API on an ephemeral port and returns a client pointed at it
async fn start_server() -> CatalogClient {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let address = listener.local_addr().expect("No local address");
    let store = Arc::new(InMemoryAspectStore::new());
    tokio::spawn(async move {
        aspect_patch::serve(listener, store)
            .await
            .expect("Server stopped");
    });
    CatalogClient::new(&format!("http://{}", address)).expect("Failed to create client")
}

fn entity_urns() -> Vec<EntityUrn> {
    [
        make_dataset_urn("hive", &format!("db.table_{}", generate_id()), "PROD"),
        format!("urn:li:chart:(looker,chart_{})", generate_id()),
        format!("urn:li:dashboard:(looker,dash_{})", generate_id()),
        format!(
            "urn:li:dataJob:(urn:li:dataFlow:(airflow,etl,prod),job_{})",
            generate_id()
        ),
    ]
    .into_iter()
    .map(|raw| EntityUrn::parse(raw).expect("Valid urn"))
    .collect()
}

async fn read<S: AspectStore>(store: &S, urn: &EntityUrn, aspect: AspectName) -> Aspect {
    store
        .get_aspect(urn, aspect)
        .await
        .expect("Read failed")
        .expect("Aspect missing")
        .value
}

async fn check_tags_patch<S: AspectStore>(store: &S, urn: &EntityUrn) {
    let tag_urn = make_tag_urn(&format!("testTag-{}", generate_id()));
    let initial = GlobalTags::new(vec![TagAssociation::with_context(tag_urn.clone(), "test")]);
    store
        .ingest_proposal(ChangeProposal::upsert(urn.clone(), initial))
        .await
        .expect("Upsert failed");

    let aspect = read(store, urn, AspectName::GlobalTags).await;
    let tags = &aspect.as_global_tags().unwrap().tags;
    assert_eq!(tags[0].tag, tag_urn);
    assert_eq!(tags[0].context.as_deref(), Some("test"));

    let new_tag = TagAssociation::new(make_tag_urn(&format!("test-{}", generate_id())));
    let proposals = PatchBuilder::for_urn(urn.clone())
        .add_tag(new_tag.clone())
        .build()
        .expect("Build failed");
    store.emit_all(proposals).await.expect("Patch failed");

    let aspect = read(store, urn, AspectName::GlobalTags).await;
    let tags = &aspect.as_global_tags().unwrap().tags;
    assert_eq!(tags[0].tag, tag_urn);
    assert_eq!(tags[0].context.as_deref(), Some("test"));
    assert_eq!(tags[1].tag, new_tag.tag);
    assert_eq!(tags[1].context, None);

    let proposals = PatchBuilder::for_urn(urn.clone())
        .remove_tag(tag_urn)
        .build()
        .expect("Build failed");
    store.emit_all(proposals).await.expect("Patch failed");

    let aspect = read(store, urn, AspectName::GlobalTags).await;
    let tags = &aspect.as_global_tags().unwrap().tags;
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].tag, new_tag.tag);
}

async fn check_terms_patch<S: AspectStore>(store: &S, urn: &EntityUrn) {
    let term_urn = make_term_urn(&format!("testTerm-{}", generate_id()));
    let initial = GlossaryTerms::new(
        vec![GlossaryTermAssociation::with_context(term_urn.clone(), "test")],
        AuditStamp::new(make_user_urn("tester")),
    );
    store
        .ingest_proposal(ChangeProposal::upsert(urn.clone(), initial.clone()))
        .await
        .expect("Upsert failed");

    let new_term = GlossaryTermAssociation::new(make_term_urn(&format!("test-{}", generate_id())));
    let proposals = PatchBuilder::for_urn(urn.clone())
        .add_term(new_term.clone())
        .build()
        .expect("Build failed");
    store.emit_all(proposals).await.expect("Patch failed");

    let aspect = read(store, urn, AspectName::GlossaryTerms).await;
    let terms = aspect.as_glossary_terms().unwrap();
    assert_eq!(terms.terms[0].urn, term_urn);
    assert_eq!(terms.terms[0].context.as_deref(), Some("test"));
    assert_eq!(terms.terms[1].urn, new_term.urn);
    assert_eq!(terms.terms[1].context, None);
    assert_eq!(terms.audit_stamp, initial.audit_stamp);

    let proposals = PatchBuilder::for_urn(urn.clone())
        .remove_term(term_urn)
        .build()
        .expect("Build failed");
    store.emit_all(proposals).await.expect("Patch failed");

    let aspect = read(store, urn, AspectName::GlossaryTerms).await;
    let terms = &aspect.as_glossary_terms().unwrap().terms;
    assert_eq!(terms.len(), 1);
    assert_eq!(terms[0].urn, new_term.urn);
}

async fn check_ownership_patch<S: AspectStore>(store: &S, urn: &EntityUrn) {
    let initial = Ownership::new(vec![Owner::new(make_user_urn("jdoe"), OwnershipType::DataOwner)]);
    store
        .ingest_proposal(ChangeProposal::upsert(urn.clone(), initial))
        .await
        .expect("Upsert failed");

    let aspect = read(store, urn, AspectName::Ownership).await;
    assert_eq!(aspect.as_ownership().unwrap().owners[0].owner, make_user_urn("jdoe"));

    let proposals = PatchBuilder::for_urn(urn.clone())
        .add_owner(Owner::new(make_user_urn("gdoe"), OwnershipType::DataOwner))
        .build()
        .expect("Build failed");
    store.emit_all(proposals).await.expect("Patch failed");

    let aspect = read(store, urn, AspectName::Ownership).await;
    assert_eq!(aspect.as_ownership().unwrap().owners.len(), 2);

    let proposals = PatchBuilder::for_urn(urn.clone())
        .remove_owner(make_user_urn("gdoe"))
        .build()
        .expect("Build failed");
    store.emit_all(proposals).await.expect("Patch failed");

    let aspect = read(store, urn, AspectName::Ownership).await;
    let owners = &aspect.as_ownership().unwrap().owners;
    assert_eq!(owners.len(), 1);
    assert_eq!(owners[0].owner, make_user_urn("jdoe"));
}

fn base_properties_aspect(urn: &EntityUrn, custom_properties: BTreeMap<String, String>) -> Aspect {
    match urn.entity_type().properties_aspect() {
        AspectName::DatasetProperties => Aspect::from(DatasetProperties {
            name: Some("test dataset".to_string()),
            description: Some("dataset used by the patch tests".to_string()),
            custom_properties,
            ..Default::default()
        }),
        AspectName::ChartInfo => Aspect::from(ChartInfo {
            title: "test chart".to_string(),
            description: "chart used by the patch tests".to_string(),
            custom_properties,
        }),
        AspectName::DashboardInfo => Aspect::from(DashboardInfo {
            title: "test dashboard".to_string(),
            description: "dashboard used by the patch tests".to_string(),
            charts: vec!["urn:li:chart:(looker,c1)".to_string()],
            custom_properties,
        }),
        AspectName::DataJobInfo => Aspect::from(DataJobInfo {
            name: "test job".to_string(),
            job_type: Some("COMMAND".to_string()),
            description: None,
            custom_properties,
        }),
        other => panic!("{} is not a properties aspect", other),
    }
}

// Strip customProperties so the remaining fields can be compared
fn without_custom_properties(aspect: &Aspect) -> Aspect {
    let mut aspect = aspect.clone();
    match &mut aspect {
        Aspect::DatasetProperties(p) => p.custom_properties.clear(),
        Aspect::ChartInfo(p) => p.custom_properties.clear(),
        Aspect::DashboardInfo(p) => p.custom_properties.clear(),
        Aspect::DataJobInfo(p) => p.custom_properties.clear(),
        _ => {}
    }
    aspect
}

async fn check_custom_properties_patch<S: AspectStore>(store: &S, urn: &EntityUrn) {
    let aspect_name = urn.entity_type().properties_aspect();
    let base: BTreeMap<String, String> =
        [("base_property".to_string(), "base_property_value".to_string())].into();
    let original = base_properties_aspect(urn, base.clone());
    store
        .ingest_proposal(ChangeProposal::upsert(urn.clone(), original.clone()))
        .await
        .expect("Upsert failed");

    let aspect = read(store, urn, aspect_name).await;
    assert_eq!(aspect.custom_properties().unwrap(), &base);

    let new_properties = [("test_property", "test_value"), ("test_property1", "test_value1")];
    let mut builder = PatchBuilder::for_urn(urn.clone());
    for (k, v) in new_properties {
        builder = builder.add_custom_property(k, v);
    }
    store
        .emit_all(builder.build().expect("Build failed"))
        .await
        .expect("Patch failed");

    let aspect = read(store, urn, aspect_name).await;
    let properties = aspect.custom_properties().unwrap();
    for (k, v) in new_properties {
        assert_eq!(properties[k], v);
    }
    // existing properties were not touched
    assert_eq!(properties["base_property"], "base_property_value");

    let proposals = PatchBuilder::for_urn(urn.clone())
        .remove_custom_property("test_property")
        .build()
        .expect("Build failed");
    store.emit_all(proposals).await.expect("Patch failed");

    let aspect = read(store, urn, aspect_name).await;
    let properties = aspect.custom_properties().unwrap();
    assert!(!properties.contains_key("test_property"));
    assert_eq!(properties["test_property1"], "test_value1");
    assert_eq!(properties["base_property"], "base_property_value");

    let proposals = PatchBuilder::for_urn(urn.clone())
        .set_custom_properties(new_properties)
        .build()
        .expect("Build failed");
    store.emit_all(proposals).await.expect("Patch failed");

    let aspect = read(store, urn, aspect_name).await;
    let properties = aspect.custom_properties().unwrap();
    assert!(!properties.contains_key("base_property"));
    assert_eq!(properties.len(), 2);
    for (k, v) in new_properties {
        assert_eq!(properties[k], v);
    }

    // the other fields of the aspect were not touched
    assert_eq!(
        without_custom_properties(&aspect),
        without_custom_properties(&original)
    );
}

#[tokio::test]
async fn test_tags_patch_over_http() {
    let client = start_server().await;
    for urn in entity_urns() {
        check_tags_patch(&client, &urn).await;
    }
}

#[tokio::test]
async fn test_terms_patch_over_http() {
    let client = start_server().await;
    for urn in entity_urns() {
        check_terms_patch(&client, &urn).await;
    }
}

#[tokio::test]
async fn test_ownership_patch_over_http() {
    let client = start_server().await;
    for urn in entity_urns() {
        check_ownership_patch(&client, &urn).await;
    }
}

#[tokio::test]
async fn test_custom_properties_patch_over_http() {
    let client = start_server().await;
    for urn in entity_urns() {
        check_custom_properties_patch(&client, &urn).await;
    }
}

#[tokio::test]
async fn test_same_scenarios_against_local_store() {
    let store = InMemoryAspectStore::new();
    for urn in entity_urns() {
        check_tags_patch(&store, &urn).await;
        check_terms_patch(&store, &urn).await;
        check_ownership_patch(&store, &urn).await;
        check_custom_properties_patch(&store, &urn).await;
    }
}

#[tokio::test]
async fn test_errors_map_back_to_client() {
    let client = start_server().await;
    let urn = entity_urns().remove(1);

    let err = client
        .get_aspect(&urn, AspectName::GlobalTags)
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(_)));

    // a dataset properties aspect cannot be written to a chart
    let err = client
        .ingest_proposal(ChangeProposal::upsert(urn.clone(), DatasetProperties::default()))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Validation { .. }));

    // replayed proposals are acknowledged once and not re-applied
    let proposal = PatchBuilder::for_urn(urn.clone())
        .add_custom_property("k", "v")
        .build()
        .expect("Build failed")
        .next()
        .expect("One proposal");
    let first = client.ingest_proposal(proposal.clone()).await.unwrap();
    let second = client.ingest_proposal(proposal).await.unwrap();
    assert!(first.applied);
    assert!(!second.applied);
    assert_eq!(first.version, second.version);
}
