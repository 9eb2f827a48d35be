mod helpers;
mod mocks;
mod webhook;
