/*!
 * Authenticated principal extractor
 *
 * Responsibility:
 * - middleware が検証済みの Principal を handler に引数として渡す
 * - 見つからない場合 (anonymous) は 401
 */

mod core;

pub use core::CurrentUser;
