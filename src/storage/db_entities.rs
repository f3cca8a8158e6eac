//! SeaORM entity models used by the database storage backend.
//!
//! These structs map to the SQLite tables created by `database_storage`:
//! - `camaras`: councils
//! - `vereadores`: councilmembers, owned by a câmara
//! - `sessoes`: legislative sessions, owned by a câmara
//! - `presencas`: attendance keyed by (sessao_id, vereador_id)
//! - `projetos`: projects under vote, owned by a câmara and optionally a sessão
//! - `votos`: votes keyed by (projeto_id, vereador_id)
//!
//! Identifiers are stored as UUID strings, timestamps as RFC3339 strings and
//! enum values as their snake_case labels.

/// Câmaras table entity model.
pub mod camaras {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "camaras")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub nome: String,
        pub cidade: String,
        pub created_at: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Vereadores table entity model.
pub mod vereadores {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "vereadores")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        /// Foreign key to `camaras.id`
        pub camara_id: String,
        pub nome: String,
        pub partido: Option<String>,
        pub ativo: bool,
        pub created_at: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::camaras::Entity",
            from = "Column::CamaraId",
            to = "super::camaras::Column::Id"
        )]
        Camara,
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Sessões table entity model.
pub mod sessoes {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "sessoes")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub titulo: String,
        pub descricao: String,
        /// RFC3339 scheduled date
        pub data: String,
        pub tipo: String,
        pub status: String,
        /// Foreign key to `camaras.id`
        pub camara_id: String,
        pub created_at: String,
        pub updated_at: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::camaras::Entity",
            from = "Column::CamaraId",
            to = "super::camaras::Column::Id"
        )]
        Camara,
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Presenças table entity model.
pub mod presencas {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "presencas")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub sessao_id: String,
        #[sea_orm(primary_key, auto_increment = false)]
        pub vereador_id: String,
        pub presente: bool,
        pub registrado_em: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::sessoes::Entity",
            from = "Column::SessaoId",
            to = "super::sessoes::Column::Id"
        )]
        Sessao,
        #[sea_orm(
            belongs_to = "super::vereadores::Entity",
            from = "Column::VereadorId",
            to = "super::vereadores::Column::Id"
        )]
        Vereador,
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Projetos table entity model.
pub mod projetos {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "projetos")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub titulo: String,
        pub descricao: String,
        pub autor: String,
        /// Optional foreign key to `sessoes.id`
        pub sessao_id: Option<String>,
        /// Foreign key to `camaras.id`
        pub camara_id: String,
        pub status: String,
        pub data_apresentacao: String,
        pub created_at: String,
        pub updated_at: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::camaras::Entity",
            from = "Column::CamaraId",
            to = "super::camaras::Column::Id"
        )]
        Camara,
        #[sea_orm(
            belongs_to = "super::sessoes::Entity",
            from = "Column::SessaoId",
            to = "super::sessoes::Column::Id"
        )]
        Sessao,
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Votos table entity model.
pub mod votos {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "votos")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub projeto_id: String,
        #[sea_orm(primary_key, auto_increment = false)]
        pub vereador_id: String,
        /// Vote label (`sim`, `nao`, `abstencao`)
        pub voto: String,
        pub registrado_em: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::projetos::Entity",
            from = "Column::ProjetoId",
            to = "super::projetos::Column::Id"
        )]
        Projeto,
        #[sea_orm(
            belongs_to = "super::vereadores::Entity",
            from = "Column::VereadorId",
            to = "super::vereadores::Column::Id"
        )]
        Vereador,
    }

    impl ActiveModelBehavior for ActiveModel {}
}
