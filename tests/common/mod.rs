#![allow(dead_code)]

use graphbridge::{ConnectionConfig, ConnectionManager, DbObject, QueryExecutor};

pub const SOCIAL_TABLES: &str = r#"
    CREATE TABLE main.PEOPLE (
        ID NVARCHAR(20) PRIMARY KEY,
        AGE INTEGER,
        SCORE DOUBLE,
        ACTIVE BOOLEAN
    );
    CREATE TABLE main.KNOWS (
        EID NVARCHAR(20) PRIMARY KEY,
        SRC NVARCHAR(20) NOT NULL,
        DST NVARCHAR(20) NOT NULL,
        SINCE BIGINT
    );
    INSERT INTO main.PEOPLE VALUES ('alice', 30, 1.5, 1), ('bob', 41, NULL, 0), ('carol', NULL, 2.0, 1);
    INSERT INTO main.KNOWS VALUES ('k1', 'alice', 'bob', 2010), ('k2', 'bob', 'carol', NULL);
"#;

pub const SOCIAL_CATALOG: &str = r#"
    INSERT INTO main.GRAPH_WORKSPACES VALUES
        ('main', 'SOCIAL', 'main', 'KNOWS', 'SRC', 'DST', 'EID', 'main', 'PEOPLE', 'ID');
    INSERT INTO main.GRAPH_WORKSPACE_COLUMNS VALUES
        ('main', 'SOCIAL', 'VERTEX', 'KEY', 'main', 'PEOPLE', 'ID'),
        ('main', 'SOCIAL', 'VERTEX', 'ATTRIBUTE', 'main', 'PEOPLE', 'AGE'),
        ('main', 'SOCIAL', 'VERTEX', 'ATTRIBUTE', 'main', 'PEOPLE', 'SCORE'),
        ('main', 'SOCIAL', 'VERTEX', 'ATTRIBUTE', 'main', 'PEOPLE', 'ACTIVE'),
        ('main', 'SOCIAL', 'EDGE', 'KEY', 'main', 'KNOWS', 'EID'),
        ('main', 'SOCIAL', 'EDGE', 'SOURCE', 'main', 'KNOWS', 'SRC'),
        ('main', 'SOCIAL', 'EDGE', 'TARGET', 'main', 'KNOWS', 'DST'),
        ('main', 'SOCIAL', 'EDGE', 'ATTRIBUTE', 'main', 'KNOWS', 'SINCE');
"#;

pub fn social() -> DbObject {
    DbObject::new("main", "SOCIAL")
}

/// In-memory connection holding the PEOPLE/KNOWS workspace.
pub fn social_manager() -> ConnectionManager {
    let mut manager = ConnectionManager::new();
    manager
        .connect(&ConnectionConfig::in_memory())
        .expect("connect");
    let handle = manager.handle().expect("handle");
    handle.execute(SOCIAL_TABLES).expect("tables");
    handle.execute(SOCIAL_CATALOG).expect("catalog");
    manager
}

pub fn exec(manager: &mut ConnectionManager, sql: &str) {
    manager.handle().expect("handle").execute(sql).expect(sql);
}
