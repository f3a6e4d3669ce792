pub mod shared {
    pub mod core {
        pub mod clock;
        pub mod primitives;
        pub mod timestamps;
    }
    pub mod infrastructure {
        pub mod confirmation;
        pub mod notifications;
        pub mod session_storage;
    }
}

pub mod modules {
    pub mod tracker {
        pub mod core {
            pub mod aggregation;
            pub mod entities;
            pub mod time;
            pub mod view_state;
            pub mod views;
            pub mod vocabulary;
        }
        pub mod use_cases {
            pub mod load_dashboard {
                pub mod handler;
            }
            pub mod load_projects_with_tasks {
                pub mod handler;
            }
            pub mod load_task_list {
                pub mod handler;
            }
            pub mod load_task_detail {
                pub mod handler;
            }
            pub mod upload_images {
                pub mod handler;
            }
        }
        pub mod adapters {
            pub mod outbound {
                pub mod api_gateway;
                pub mod api_gateway_http;
                pub mod api_gateway_in_memory;
            }
        }
        pub mod session {
            pub mod errors;
            pub mod refresh;
            pub mod store;
        }
    }
}

pub mod shell;
