use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::info;
use sboxsession::catalog::{Table, TableIdentifier};
use sboxsession::conf::options::CaseInsensitiveMap;
use sboxsession::error::{Error, Result};
use sboxsession::function::FunctionInfo;
use sboxsession::listener::QueryExecutionListener;
use sboxsession::resource::FunctionResource;
use sboxsession::runtime::classloader::context_class_loader;
use sboxsession::session::builder::SessionStateBuilder;
use sboxsession::Session;

use super::fixture::Fixture;

#[test]
fn test_clone_config_is_independent() -> Result<()> {
    setup!(fixture);
    let session = fixture.session()?;
    session.state().conf().set("k", "original")?;

    let cloned = session.clone_session()?;
    assert_eq!(Some("original".to_string()), cloned.state().conf().get("k"));

    cloned.state().conf().set("k", "cloned")?;
    session.state().conf().set("other", "x")?;
    assert_eq!(Some("original".to_string()), session.state().conf().get("k"));
    assert_eq!(Some("cloned".to_string()), cloned.state().conf().get("k"));
    assert!(!cloned.state().conf().contains("other"));
    Ok(())
}

#[test]
fn test_clone_does_not_build_source_services() -> Result<()> {
    setup!(fixture);
    let session = fixture.counted_session()?;
    let cloned = session.clone_session()?;
    assert_eq!(0, fixture.catalogs_built());
    assert!(session.state().built_services().is_empty());
    assert!(cloned.state().built_services().is_empty());

    // the clone builds from the same factories, bound to itself
    cloned.state().catalog()?;
    assert_eq!(1, fixture.catalogs_built());
    assert!(session.state().built_services().is_empty());

    session.state().catalog()?;
    assert_eq!(2, fixture.catalogs_built());
    assert!(!Arc::ptr_eq(&session.state().catalog()?, &cloned.state().catalog()?));
    Ok(())
}

#[test]
fn test_clone_gets_its_own_catalog() -> Result<()> {
    setup!(fixture);
    let session = fixture.session()?;
    session.state().catalog()?.create_table(Table::new("default", "t"), false)?;

    let cloned = session.clone_session()?;
    assert!(!cloned.state().catalog()?.table_exists(&TableIdentifier::new("t")));
    Ok(())
}

#[test]
fn test_clone_strategy_can_share_catalog() -> Result<()> {
    setup!(fixture);
    let session = Session::with_builder(Arc::clone(&fixture.shared), |b| {
        Ok(b.with_clone_fn(|handle, state| {
            let catalog = state.catalog()?;
            Ok(SessionStateBuilder::from_parent(handle.clone(), state)
                .with_catalog_factory(move |_, _| Ok(Arc::clone(&catalog)))
                .build())
        }))
    })?;
    let cloned = session.clone_session()?;
    assert!(Arc::ptr_eq(&session.state().catalog()?, &cloned.state().catalog()?));
    Ok(())
}

#[test]
fn test_concurrent_access_builds_once() -> Result<()> {
    setup!(fixture);
    let session = Arc::new(fixture.counted_session()?);
    let handles = (0..8)
        .map(|_| {
            let session = Arc::clone(&session);
            thread::spawn(move || {
                session.state().analyzer().and_then(|_| session.state().catalog())
            })
        })
        .collect::<Vec<_>>();
    let catalogs = handles.into_iter().map(|h| h.join().unwrap()).collect::<Result<Vec<_>>>()?;
    assert!(catalogs.iter().all(|c| Arc::ptr_eq(c, &catalogs[0])));
    assert_eq!(1, fixture.catalogs_built());
    Ok(())
}

#[test]
fn test_jars_are_visible_across_sessions() -> Result<()> {
    setup!(fixture);
    let s1 = fixture.session()?;
    let s2 = s1.new_session()?;

    s1.state().add_jar("/tmp/udfs.jar")?;
    s2.state().resource_loader()?.load_resource(&FunctionResource::jar("hdfs://nn/x.jar"))?;
    s2.state().resource_loader()?.load_resource(&FunctionResource::file("/tmp/lookup.csv"))?;

    let urls = fixture.shared.class_loader().urls();
    let urls = urls.iter().map(|it| it.as_str()).collect::<Vec<_>>();
    assert_eq!(vec!["file:///tmp/udfs.jar", "hdfs://nn/x.jar"], urls);
    assert_eq!(vec!["/tmp/udfs.jar", "hdfs://nn/x.jar"], fixture.jars());
    assert_eq!(vec!["/tmp/lookup.csv"], fixture.files());
    assert!(Arc::ptr_eq(fixture.shared.class_loader(), &context_class_loader().unwrap()));
    Ok(())
}

#[test]
fn test_archive_is_rejected() -> Result<()> {
    setup!(fixture);
    let session = fixture.session()?;
    let loader = session.state().resource_loader()?;
    let err = loader.load_resource(&FunctionResource::archive("hdfs://nn/env.tgz")).unwrap_err();
    info!("archive load failed with: {}", err);
    assert!(matches!(err, Error::Unsupported(_)));
    assert!(fixture.jars().is_empty());
    assert!(fixture.files().is_empty());
    Ok(())
}

#[test]
fn test_register_function_with_resources() -> Result<()> {
    setup!(fixture);
    let session = fixture.session()?;
    let info = FunctionInfo::new("geo_hash", "com.example.GeoHash")
        .with_resource(FunctionResource::jar("/opt/udf/geo.jar"));
    session.state().register_function(info, false)?;
    assert!(session.state().function_registry().contains("GEO_HASH"));
    assert_eq!(vec!["/opt/udf/geo.jar"], fixture.jars());

    // registered functions carry over to clones, not to new sessions
    assert!(session.clone_session()?.state().function_registry().contains("geo_hash"));
    assert!(!session.new_session()?.state().function_registry().contains("geo_hash"));
    Ok(())
}

#[derive(Debug)]
struct NoopListener;

impl QueryExecutionListener for NoopListener {
    fn on_success(&self, _action: &str, _duration: Duration) {}

    fn on_failure(&self, _action: &str, _error: &Error) {}
}

#[test]
fn test_clone_copies_listeners() -> Result<()> {
    setup!(fixture);
    let session = fixture.session()?;
    session.state().listener_manager().register(Arc::new(NoopListener));
    session.state().streaming_query_manager().start("clicks")?;

    let cloned = session.clone_session()?;
    assert_eq!(1, cloned.state().listener_manager().len());
    assert!(cloned.state().streaming_query_manager().active().is_empty());

    cloned.state().listener_manager().clear();
    assert_eq!(1, session.state().listener_manager().len());
    Ok(())
}

#[test]
fn test_hadoop_conf_projection() -> Result<()> {
    setup!(fixture);
    let session = fixture.session()?;
    let state = session.state();
    state.conf().set("a", "2")?;
    state.conf().set("b", "3")?;
    state.conf().set_option("c", None)?;

    let conf = state.new_hadoop_conf();
    assert_eq!(Some("2"), conf.get("a"));
    assert_eq!(Some("3"), conf.get("b"));
    assert_eq!(None, conf.get("c"));
    assert_eq!(Some("hdfs://nn:8020"), conf.get("fs.defaultFS"));

    let options = CaseInsensitiveMap::from([("path", "/x"), ("paths", "/y"), ("z", "1")]);
    let with_options = state.new_hadoop_conf_with_options(&options);
    assert_eq!(conf.len() + 1, with_options.len());
    assert_eq!(Some("1"), with_options.get("z"));
    assert_eq!(None, with_options.get("path"));
    Ok(())
}

#[test]
fn test_connection_url_outside_container() -> Result<()> {
    setup!(fixture);
    let session = fixture.session()?;
    let state = session.state();
    assert!(matches!(state.connection_url(), Err(Error::Config(_))));

    state.conf().set("sbox.connection.url", "jdbc://host/${user}")?;
    state.set_user("alice");
    assert_eq!("jdbc://host/alice", state.connection_url()?);

    state.conf().set("sbox.connection.principal", "svc@REALM")?;
    assert_eq!("jdbc://host/alice;principal=svc@REALM", state.connection_url()?);
    Ok(())
}

#[test]
fn test_connection_url_in_container() -> Result<()> {
    setup!(fixture, managed);
    let session = fixture.session()?;
    let state = session.state();
    state.conf().set("sbox.connection.url", "jdbc://host/${user}")?;
    state.conf().set("sbox.connection.principal", "svc@REALM")?;
    state.set_user("bob");
    assert_eq!("jdbc://host/bob", state.connection_url()?);

    state.conf().set("sbox.connection.delegation_token.enabled", "true")?;
    assert_eq!("jdbc://host/bob;auth=delegationToken", state.connection_url()?);
    Ok(())
}
