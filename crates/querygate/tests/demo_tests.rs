// End-to-end runs of the injection demo with captured output

use querygate::{Demo, DemoConfig, RunSummary};
use querygate::demo::{CREATE_USERS_SQL, SEED_USERS_SQL};
use querygate::{CountingStore, Database};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn run_demo(config: DemoConfig) -> (i32, String) {
    let mut demo = Demo::new(config, Vec::new());
    let code = demo.run().unwrap();
    (code, String::from_utf8(demo.into_output()).unwrap())
}

#[test]
fn test_demo_output() {
    let (code, output) = run_demo(DemoConfig::default().with_seed(7));
    assert_eq!(code, 0);

    let expected_head = "SQL Injection Example\n\
        Connected to the database.\n\
        USERS table created.\n\
        \n\
        SQL: SELECT * from USERS ==> 4 records found.\n\
        User: Fred [UID=1 PWD=Flinstone]\n\
        User: Barney [UID=2 PWD=Rubble]\n\
        User: Wilma [UID=3 PWD=Flinstone]\n\
        User: Betty [UID=4 PWD=Rubble]\n\
        \n\
        SQL: SELECT ID, NAME, PASSWORD FROM USERS WHERE NAME='Fred' ==> 1 records found.\n\
        User: Fred [UID=1 PWD=Flinstone]\n";
    assert!(output.starts_with(expected_head), "{}", output);

    let rejections: Vec<&str> = output[expected_head.len()..].lines().collect();
    assert_eq!(rejections.len(), 5);
    for line in rejections {
        assert!(
            line.starts_with(
                "Query rejected: query parameter contains whitespace, likely SQL injection. \
                 Parameter entered is: 'Fred' or "
            ),
            "{}",
            line
        );
    }
}

#[test]
fn test_same_seed_same_output() {
    let (_, first) = run_demo(DemoConfig::default().with_seed(11));
    let (_, second) = run_demo(DemoConfig::default().with_seed(11));
    assert_eq!(first, second);
}

#[test]
fn test_injection_rounds_configurable() {
    let (code, output) = run_demo(DemoConfig::default().with_seed(3).with_injection_rounds(0));
    assert_eq!(code, 0);
    assert!(!output.contains("Query rejected"));

    let (_, output) = run_demo(DemoConfig::default().with_seed(3).with_injection_rounds(12));
    assert_eq!(output.matches("Query rejected").count(), 12);
}

#[test]
fn test_run_queries_summary() {
    let db = Database::in_memory().unwrap();
    db.execute(CREATE_USERS_SQL).unwrap();
    db.execute(SEED_USERS_SQL).unwrap();
    let mut store = CountingStore::new(db);
    let mut rng = StdRng::seed_from_u64(5);

    let mut demo = Demo::new(DemoConfig::default(), Vec::new());
    let summary = demo.run_queries(&mut store, &mut rng).unwrap();

    assert_eq!(
        summary,
        RunSummary {
            executed: 2,
            rejected: 5,
            failed: 0,
        }
    );
    // Only the two admitted queries reached the store
    assert_eq!(store.calls(), 2);
}

#[test]
fn test_initialization_failure_message() {
    let db = Database::in_memory().unwrap();
    db.execute(CREATE_USERS_SQL).unwrap();
    let mut store = CountingStore::new(db);

    let mut demo = Demo::new(DemoConfig::default(), Vec::new());
    assert!(!demo.initialize_database(&mut store).unwrap());

    let output = String::from_utf8(demo.into_output()).unwrap();
    assert_eq!(
        output,
        "Failed to create USERS table. ERROR = table USERS already exists\n"
    );
}
