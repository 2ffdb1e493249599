pub mod strapi;
